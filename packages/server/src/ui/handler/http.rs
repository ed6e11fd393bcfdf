//! HTTP handlers.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use uuid::Uuid;

/// Body of `GET <path>/info`, probed by SockJS clients before opening a
/// transport.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub websocket: bool,
    pub origins: Vec<String>,
    pub cookie_needed: bool,
    pub entropy: u32,
}

pub async fn sockjs_info() -> impl IntoResponse {
    let info = InfoResponse {
        websocket: true,
        origins: vec!["*:*".to_string()],
        cookie_needed: false,
        entropy: Uuid::new_v4().as_u128() as u32,
    };

    (StatusCode::OK, Json(info))
}
