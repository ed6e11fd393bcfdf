//! Websocket URL resolution.
//!
//! SockJS clients open their websocket at
//! `<base>/<path>/<server_id>/<session_id>/websocket`, where `server_id` is
//! three decimal digits used for sticky routing and `session_id` is a random
//! token. The raw variant lives at `<base>/<path>/websocket`.

use uuid::Uuid;

use crate::{
    config::{ClientConfig, Transport},
    error::ClientError,
};

/// Length of the random SockJS session token.
const SESSION_ID_LEN: usize = 8;

/// Resolve the websocket URL for `config`, drawing fresh SockJS ids.
pub fn websocket_url(config: &ClientConfig) -> Result<String, ClientError> {
    let base = websocket_base(&config.base_url)?;
    let url = match config.transport {
        Transport::SockJs => format!(
            "{}{}/{}/{}/websocket",
            base,
            config.path,
            generate_server_id(),
            generate_session_id()
        ),
        Transport::Raw => format!("{}{}/websocket", base, config.path),
    };
    Ok(url)
}

/// Map an `http(s)`/`ws(s)` base URL onto its websocket scheme.
fn websocket_base(base_url: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidEndpoint {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    let (scheme, rest) = base_url
        .trim()
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme"))?;

    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("unsupported scheme")),
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid("missing host"));
    }

    Ok(format!("{}://{}", ws_scheme, rest))
}

fn generate_server_id() -> String {
    format!("{:03}", Uuid::new_v4().as_u128() % 1000)
}

fn generate_session_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SESSION_ID_LEN);
    id
}
