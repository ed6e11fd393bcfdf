//! SockJS websocket-transport framing.
//!
//! Server → client frames are a one-letter type followed by an optional JSON
//! payload:
//!
//! | frame          | meaning                         |
//! |----------------|---------------------------------|
//! | `o`            | session opened                  |
//! | `h`            | heartbeat                       |
//! | `a["m1","m2"]` | one or more application messages |
//! | `m"m1"`        | single message (legacy)         |
//! | `c[3000,"Go away!"]` | session closed            |
//!
//! Client → server frames are a plain JSON array of strings. Servers also
//! accept a bare JSON string.

use serde_json::Value;
use thiserror::Error;

/// Close code sent when the server shuts a session down normally.
pub const CLOSE_GO_AWAY: u16 = 3000;

/// Errors produced while decoding SockJS frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("empty SockJS frame")]
    Empty,

    #[error("unknown SockJS frame type '{0}'")]
    UnknownType(char),

    #[error("malformed SockJS frame payload: {0}")]
    Payload(String),
}

/// A decoded server → client SockJS frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SockJsFrame {
    Open,
    Heartbeat,
    Messages(Vec<String>),
    Close { code: u16, reason: String },
}

impl SockJsFrame {
    /// Render the frame as websocket text.
    pub fn encode(&self) -> String {
        match self {
            Self::Open => "o".to_string(),
            Self::Heartbeat => "h".to_string(),
            Self::Messages(messages) => format!("a{}", Value::from(messages.clone())),
            Self::Close { code, reason } => {
                format!("c{}", Value::from(vec![Value::from(*code), Value::from(reason.as_str())]))
            }
        }
    }

    /// Parse websocket text received from a SockJS server.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(FrameError::Empty)?;
        let payload = chars.as_str();

        match kind {
            'o' => Ok(Self::Open),
            'h' => Ok(Self::Heartbeat),
            'a' => {
                let messages: Vec<String> = serde_json::from_str(payload)
                    .map_err(|e| FrameError::Payload(e.to_string()))?;
                Ok(Self::Messages(messages))
            }
            'm' => {
                let message: String = serde_json::from_str(payload)
                    .map_err(|e| FrameError::Payload(e.to_string()))?;
                Ok(Self::Messages(vec![message]))
            }
            'c' => {
                let (code, reason): (u16, String) = serde_json::from_str(payload)
                    .map_err(|e| FrameError::Payload(e.to_string()))?;
                Ok(Self::Close { code, reason })
            }
            other => Err(FrameError::UnknownType(other)),
        }
    }
}

/// Wrap outbound payloads into a client → server frame.
pub fn encode_client_messages<S: AsRef<str>>(messages: &[S]) -> String {
    Value::from(
        messages
            .iter()
            .map(|m| Value::from(m.as_ref()))
            .collect::<Vec<_>>(),
    )
    .to_string()
}

/// Unpack a client → server frame into its payloads.
///
/// An empty websocket message carries no payloads.
pub fn decode_client_messages(text: &str) -> Result<Vec<String>, FrameError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(text).map_err(|e| FrameError::Payload(e.to_string()))? {
        Value::String(message) => Ok(vec![message]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(message) => Ok(message),
                other => Err(FrameError::Payload(format!(
                    "expected string message, got {}",
                    other
                ))),
            })
            .collect(),
        other => Err(FrameError::Payload(format!(
            "expected array of messages, got {}",
            other
        ))),
    }
}
