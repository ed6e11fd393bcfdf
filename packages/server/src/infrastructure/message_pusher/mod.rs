//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket セッションへの配信

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
