//! SockJS smoke-test client.
//!
//! Opens one connection to a `/testSock`-style endpoint, sends `{name, str}`
//! chat messages and logs every chat message that comes back.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use testsock_client::{ClientConfig, TracingMessageLog, connect};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = connect(&ClientConfig::new("http://localhost:8080"))?;
//! client.log_messages(Arc::new(TracingMessageLog));
//! client.wait_open().await?;
//! client.send("홍길동", "누구세요");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod prompt;

pub use config::{ClientConfig, Transport};
pub use connection::{ConnectionState, SocketTestClient, Subscription, connect};
pub use error::ClientError;
pub use handler::{MessageLog, TracingMessageLog, log_chat_frame};
pub use testsock_shared::{ChatMessage, CodecError};
