//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use crate::{domain::MessagePusher, usecase::RelayMessageUseCase};

/// Shared application state
pub struct AppState {
    /// MessagePusher（セッション登録・解除に使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// SockJS heartbeat interval
    pub heartbeat_interval: Duration,
}
