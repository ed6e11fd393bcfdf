//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::sockjs_info;
pub use websocket::{raw_websocket_handler, sockjs_websocket_handler};
