//! MessagePusher trait: pushing payloads to connected sessions.
//!
//! The UI layer creates the socket and hands its outbound channel to the
//! pusher; use cases only ever talk to this trait.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::session::SessionId;

/// Outbound channel of one session. Carries bare payloads; the session's
/// writer applies transport framing.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    /// Every target session rejected the payload
    #[error("Failed to push message to all {0} sessions")]
    AllTargetsFailed(usize),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Start delivering payloads to `session_id` through `sender`.
    async fn register_session(&self, session_id: SessionId, sender: PusherChannel);

    async fn unregister_session(&self, session_id: &SessionId);

    /// Push `content` to every registered session.
    ///
    /// Returns the number of sessions the payload was handed to. Individual
    /// failures are tolerated as long as at least one session accepted it.
    async fn broadcast(&self, content: &str) -> Result<usize, MessagePushError>;

    async fn session_count(&self) -> usize;
}
