//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中セッションの `UnboundedSender` を管理
//! - 全セッションへのペイロード送信（broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成とフレーミング（SockJS / raw）は UI 層
//! （`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、素のペイロードを流すだけです。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let sessions = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(sessions.clone());
///
/// pusher.broadcast("{\"name\":\"Alice\",\"str\":\"hello\"}").await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のセッションの WebSocket sender
    sessions: Arc<Mutex<HashMap<SessionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(sessions: Arc<Mutex<HashMap<SessionId, PusherChannel>>>) -> Self {
        Self { sessions }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_session(&self, session_id: SessionId, sender: PusherChannel) {
        let mut sessions = self.sessions.lock().await;
        tracing::debug!("Session '{}' registered to MessagePusher", session_id);
        sessions.insert(session_id, sender);
    }

    async fn unregister_session(&self, session_id: &SessionId) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
    }

    async fn broadcast(&self, content: &str) -> Result<usize, MessagePushError> {
        let sessions = self.sessions.lock().await;

        let mut delivered = 0;
        for (session_id, sender) in sessions.iter() {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(content.to_string()) {
                tracing::warn!("Failed to push message to session '{}': {}", session_id, e);
            } else {
                tracing::debug!("Broadcasted message to session '{}'", session_id);
                delivered += 1;
            }
        }

        if delivered == 0 && !sessions.is_empty() {
            return Err(MessagePushError::AllTargetsFailed(sessions.len()));
        }

        Ok(delivered)
    }

    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
