//! Error types for the testsock client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The configured base URL cannot be turned into a websocket URL
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The connection never opened, or has already closed
    #[error("Connection to '{0}' is not open")]
    NotOpen(String),
}
