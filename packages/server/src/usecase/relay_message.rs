//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 受信したペイロードが加工されずに全セッションへ配られることを保証する
//! - チャットメッセージとして解釈できないペイロードも中継されることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：チャットメッセージの中継
//! - 異常系：全セッションへの配信失敗
//! - エッジケース：JSON でないペイロード

use std::sync::Arc;

use testsock_shared::ChatMessage;

use crate::domain::{MessagePusher, SessionId};

use super::error::RelayError;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMessageUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 受信したペイロードを送信者を含む全セッションへ中継する
    ///
    /// # Arguments
    ///
    /// * `from` - ペイロードを送ってきたセッション
    /// * `payload` - 受信したテキスト（フレーミング除去済み）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 配信したセッション数
    /// * `Err(RelayError)` - 配信失敗
    pub async fn execute(&self, from: &SessionId, payload: &str) -> Result<usize, RelayError> {
        match ChatMessage::decode(payload) {
            Ok(msg) => {
                tracing::info!(
                    "Relaying message from '{}' (session '{}'): {}",
                    msg.name,
                    from,
                    msg.body
                );
            }
            Err(e) => {
                tracing::debug!(
                    "Relaying non-chat payload from session '{}' ({}): {}",
                    from,
                    e,
                    payload
                );
            }
        }

        self.message_pusher
            .broadcast(payload)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))
    }
}
