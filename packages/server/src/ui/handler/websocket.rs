//! WebSocket connection handlers.
//!
//! Both endpoints share one session loop; they differ only in framing:
//! SockJS sessions get `o`/`h`/`a[...]` frames and send JSON arrays, raw
//! sessions exchange bare payloads.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::{sync::mpsc, time::Instant};

use testsock_shared::{
    SockJsFrame,
    sockjs::decode_client_messages,
};

use crate::{domain::SessionId, ui::state::AppState};

/// Framing applied to one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFraming {
    SockJs,
    Raw,
}

impl SessionFraming {
    /// Wrap one outbound payload for the wire.
    fn pack(self, payload: String) -> String {
        match self {
            Self::SockJs => SockJsFrame::Messages(vec![payload]).encode(),
            Self::Raw => payload,
        }
    }

    /// Extract inbound payloads from one websocket text message.
    fn unpack(self, text: &str) -> Result<Vec<String>, testsock_shared::FrameError> {
        match self {
            Self::SockJs => decode_client_messages(text),
            Self::Raw => Ok(vec![text.to_string()]),
        }
    }
}

/// `GET <path>/{server_id}/{session_id}/websocket`
pub async fn sockjs_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((server_id, session_id)): Path<(String, String)>,
) -> impl IntoResponse {
    tracing::info!(
        "SockJS websocket requested (server '{}', client session '{}')",
        server_id,
        session_id
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, SessionFraming::SockJs))
}

/// `GET <path>/websocket`
pub async fn raw_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("Raw websocket requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state, SessionFraming::Raw))
}

/// Spawns a task that forwards payloads from the rx channel to the WebSocket sender.
///
/// SockJS sessions also get a heartbeat frame every `heartbeat` while idle.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    framing: SessionFraming,
    heartbeat: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);

        loop {
            let text = tokio::select! {
                payload = rx.recv() => match payload {
                    Some(payload) => framing.pack(payload),
                    None => break,
                },
                _ = ticker.tick(), if framing == SessionFraming::SockJs => {
                    SockJsFrame::Heartbeat.encode()
                }
            };

            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, framing: SessionFraming) {
    let session_id = SessionId::generate();
    let (mut sender, mut receiver) = socket.split();

    // Register before announcing the session so a client that sends right
    // after `o` also receives its own echo.
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_session(session_id.clone(), tx)
        .await;
    tracing::info!(
        "Session '{}' connected ({:?}), {} session(s) online",
        session_id,
        framing,
        state.message_pusher.session_count().await
    );

    if framing == SessionFraming::SockJs
        && let Err(e) = sender
            .send(Message::Text(SockJsFrame::Open.encode().into()))
            .await
    {
        tracing::error!("Failed to send open frame to '{}': {}", session_id, e);
        state.message_pusher.unregister_session(&session_id).await;
        return;
    }

    let session_id_for_recv = session_id.clone();
    let state_for_recv = state.clone();

    // Spawn a task to receive payloads from this session
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text: {}", text.as_str());

                    let payloads = match framing.unpack(text.as_str()) {
                        Ok(payloads) => payloads,
                        Err(e) => {
                            tracing::warn!(
                                "Dropping malformed frame from '{}': {}",
                                session_id_for_recv,
                                e
                            );
                            continue;
                        }
                    };

                    for payload in payloads {
                        if let Err(e) = state_for_recv
                            .relay_message_usecase
                            .execute(&session_id_for_recv, &payload)
                            .await
                        {
                            tracing::warn!("Failed to relay message: {}", e);
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Session '{}' requested close", session_id_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender, framing, state.heartbeat_interval);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.message_pusher.unregister_session(&session_id).await;
    tracing::info!(
        "Session '{}' disconnected, {} session(s) online",
        session_id,
        state.message_pusher.session_count().await
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockjs_framing_wraps_payload_in_array_frame() {
        // テスト項目: SockJS セッションではペイロードが a[...] フレームに包まれる
        // given (前提条件):
        let payload = r#"{"name":"Alice","str":"hello"}"#.to_string();

        // when (操作):
        let text = SessionFraming::SockJs.pack(payload.clone());

        // then (期待する結果):
        assert_eq!(
            SockJsFrame::decode(&text),
            Ok(SockJsFrame::Messages(vec![payload]))
        );
    }

    #[test]
    fn test_raw_framing_passes_payload_through() {
        // テスト項目: raw セッションではペイロードがそのまま送受信される
        // given (前提条件):
        let payload = r#"{"name":"Alice","str":"hello"}"#;

        // when (操作):
        let wrapped = SessionFraming::Raw.pack(payload.to_string());
        let unwrapped = SessionFraming::Raw.unpack(payload);

        // then (期待する結果):
        assert_eq!(wrapped, payload);
        assert_eq!(unwrapped, Ok(vec![payload.to_string()]));
    }

    #[test]
    fn test_sockjs_framing_unpacks_client_array() {
        // テスト項目: SockJS クライアントの配列フレームから複数ペイロードが取り出される
        // given (前提条件):
        let text = r#"["one","two"]"#;

        // when (操作):
        let payloads = SessionFraming::SockJs.unpack(text);

        // then (期待する結果):
        assert_eq!(payloads, Ok(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn test_sockjs_framing_rejects_non_array_object() {
        // テスト項目: SockJS セッションで JSON オブジェクトを直接送るとエラーになる
        // given (前提条件):
        let text = r#"{"name":"Alice","str":"hello"}"#;

        // when (操作):
        let payloads = SessionFraming::SockJs.unpack(text);

        // then (期待する結果):
        assert!(payloads.is_err());
    }
}
