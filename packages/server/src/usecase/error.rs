//! UseCase 層のエラー型

use thiserror::Error;

/// メッセージ中継のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
}
