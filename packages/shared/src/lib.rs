//! Wire types and utilities shared by the testsock client and relay server.

pub mod endpoint;
pub mod logger;
pub mod message;
pub mod sockjs;

pub use message::{ChatMessage, CodecError};
pub use sockjs::{FrameError, SockJsFrame};
