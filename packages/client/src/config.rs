//! Client configuration.

use clap::ValueEnum;

use testsock_shared::endpoint::{DEFAULT_ENDPOINT_PATH, normalize_path};

/// Default origin the endpoint path is resolved against.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Inbound frames a slow listener may fall behind by before frames are skipped.
pub const DEFAULT_LISTENER_CAPACITY: usize = 64;

/// How frames are carried over the websocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Transport {
    /// SockJS websocket transport (`<path>/<server>/<session>/websocket`)
    #[default]
    #[value(name = "sockjs")]
    SockJs,
    /// Plain WebSocket (`<path>/websocket`)
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the hosting page, `http(s)://` or `ws(s)://`
    pub base_url: String,
    /// Endpoint path, normalized to `/segment` form
    pub path: String,
    pub transport: Transport,
    pub listener_capacity: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = normalize_path(path);
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_listener_capacity(mut self, capacity: usize) -> Self {
        self.listener_capacity = capacity.max(1);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path: DEFAULT_ENDPOINT_PATH.to_string(),
            transport: Transport::default(),
            listener_capacity: DEFAULT_LISTENER_CAPACITY,
        }
    }
}
