//! Socket test client: one connection, `send`, and message listeners.
//!
//! [`connect`] returns immediately with a [`SocketTestClient`] handle while the
//! websocket handshake runs in a background task. From then on the handle is
//! reactive:
//!
//! - [`SocketTestClient::send`] encodes a [`ChatMessage`] and hands it to the
//!   writer. It is fire-and-forget: when the connection is not open the frame
//!   is dropped and the caller never observes an error.
//! - [`SocketTestClient::subscribe`] / [`SocketTestClient::on_message`] fan
//!   every inbound payload out to any number of listeners. Payloads that
//!   arrive while nobody listens are discarded.
//!
//! Connection failures are logged and reflected as [`ConnectionState::Closed`];
//! there is no retry.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use testsock_shared::{ChatMessage, SockJsFrame, sockjs::encode_client_messages};

use crate::{
    config::{ClientConfig, Transport},
    endpoint::websocket_url,
    error::ClientError,
    handler::{MessageLog, log_chat_frame},
};

/// Transport state as seen by the background connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Commands for the writer half.
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Handle to one test socket connection.
///
/// Dropping the handle closes the connection.
pub struct SocketTestClient {
    url: String,
    state: watch::Receiver<ConnectionState>,
    outbound: mpsc::UnboundedSender<Outbound>,
    inbound: InboundSlot,
}

/// Sender used to create new subscriptions. Emptied by the connection task
/// when it ends, so every subscription observes the close.
type InboundSlot = Arc<Mutex<Option<broadcast::Sender<String>>>>;

/// Receiver of inbound payloads for one listener.
pub struct Subscription {
    rx: broadcast::Receiver<String>,
}

impl Subscription {
    /// Wait for the next inbound payload.
    ///
    /// Returns `None` once the connection has closed.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Listener fell behind, {} frames skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Open a connection to the configured endpoint.
///
/// Only an unusable base URL is reported here. The handshake runs in the
/// background; use [`SocketTestClient::wait_open`] to observe its outcome.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn connect(config: &ClientConfig) -> Result<SocketTestClient, ClientError> {
    let url = websocket_url(config)?;

    let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, _) = broadcast::channel(config.listener_capacity.max(1));
    let inbound: InboundSlot = Arc::new(Mutex::new(Some(inbound_tx.clone())));

    tracing::info!("Connecting to {}", url);
    tokio::spawn(run_connection(
        url.clone(),
        config.transport,
        Arc::new(state_tx),
        outbound_rx,
        inbound_tx,
        inbound.clone(),
    ));

    Ok(SocketTestClient {
        url,
        state: state_rx,
        outbound: outbound_tx,
        inbound,
    })
}

impl SocketTestClient {
    /// Resolved websocket URL of this connection
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Wait until the handshake has finished.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotOpen`] if the connection closed instead of opening.
    pub async fn wait_open(&self) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(|s| *s != ConnectionState::Connecting)
            .await
            .map(|s| *s)
            .unwrap_or(ConnectionState::Closed);

        match reached {
            ConnectionState::Open => Ok(()),
            _ => Err(ClientError::NotOpen(self.url.clone())),
        }
    }

    /// Wait until the connection has closed.
    pub async fn wait_closed(&self) {
        let mut state = self.state.clone();
        // A dropped sender means the connection task is gone, i.e. closed.
        let _ = state.wait_for(|s| *s == ConnectionState::Closed).await;
    }

    /// Send one chat message. Fire-and-forget.
    pub fn send(&self, name: &str, body: &str) {
        match ChatMessage::new(name, body).encode() {
            Ok(json) => self.send_text(json),
            Err(e) => tracing::error!("Failed to serialize message: {}", e),
        }
    }

    /// Send one raw text payload. Dropped unless the connection is open.
    pub fn send_text(&self, payload: String) {
        if self.state() != ConnectionState::Open {
            tracing::debug!("Connection is not open, dropping outbound frame");
            return;
        }

        if self.outbound.send(Outbound::Text(payload)).is_err() {
            tracing::debug!("Connection task has ended, dropping outbound frame");
        }
    }

    /// Register an independent listener for inbound payloads.
    pub fn subscribe(&self) -> Subscription {
        let slot = self.inbound.lock().unwrap_or_else(|e| e.into_inner());
        let rx = match slot.as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                // Connection already gone: hand out a receiver that is closed.
                let (tx, rx) = broadcast::channel(1);
                drop(tx);
                rx
            }
        };
        Subscription { rx }
    }

    /// Invoke `handler` once per inbound payload until the connection closes.
    ///
    /// A handler error is reported and affects only that payload.
    pub fn on_message<F, E>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(&str) -> Result<(), E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut subscription = self.subscribe();
        tokio::spawn(async move {
            while let Some(payload) = subscription.recv().await {
                if let Err(e) = handler(&payload) {
                    tracing::warn!("Message handler failed: {}", e);
                }
            }
        })
    }

    /// Register the default listener: decode each payload as a chat message
    /// and record one line in `log`.
    pub fn log_messages(&self, log: Arc<dyn MessageLog>) -> JoinHandle<()> {
        self.on_message(move |text| log_chat_frame(log.as_ref(), text).map(|_| ()))
    }

    /// Ask the connection to close.
    pub fn close(&self) {
        if self.outbound.send(Outbound::Close).is_err() {
            tracing::debug!("Connection task has already ended");
        }
    }
}

/// Background task owning the websocket for the lifetime of the connection.
async fn run_connection(
    url: String,
    transport: Transport,
    state: Arc<watch::Sender<ConnectionState>>,
    outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    inbound_tx: broadcast::Sender<String>,
    inbound_slot: InboundSlot,
) {
    drive_connection(&url, transport, state.clone(), outbound_rx, inbound_tx).await;

    // Closing the slot drops the last sender, which ends every subscription.
    inbound_slot
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();
    state.send_replace(ConnectionState::Closed);
    tracing::info!("Connection to {} closed", url);
}

async fn drive_connection(
    url: &str,
    transport: Transport,
    state: Arc<watch::Sender<ConnectionState>>,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    inbound_tx: broadcast::Sender<String>,
) {
    let ws_stream = match connect_async(url).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            return;
        }
    };

    tracing::info!("Connected to {}", url);
    if transport == Transport::Raw {
        state.send_replace(ConnectionState::Open);
    }

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming frames
    let state_for_read = state.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match transport {
                    Transport::Raw => deliver(&inbound_tx, text.to_string()),
                    Transport::SockJs => match SockJsFrame::decode(text.as_str()) {
                        Ok(SockJsFrame::Open) => {
                            tracing::info!("SockJS session opened");
                            state_for_read.send_replace(ConnectionState::Open);
                        }
                        Ok(SockJsFrame::Heartbeat) => {
                            tracing::trace!("SockJS heartbeat");
                        }
                        Ok(SockJsFrame::Messages(payloads)) => {
                            for payload in payloads {
                                deliver(&inbound_tx, payload);
                            }
                        }
                        Ok(SockJsFrame::Close { code, reason }) => {
                            tracing::info!(
                                "SockJS session closed by server: {} {}",
                                code,
                                reason
                            );
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Ignoring malformed SockJS frame: {}", e);
                        }
                    },
                },
                Ok(Message::Binary(data)) => {
                    tracing::debug!("Ignoring binary frame ({} bytes)", data.len());
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward outbound payloads to the WebSocket
    let mut write_task = tokio::spawn(async move {
        while let Some(command) = outbound_rx.recv().await {
            match command {
                Outbound::Text(payload) => {
                    let text = match transport {
                        Transport::SockJs => encode_client_messages(&[payload]),
                        Transport::Raw => payload,
                    };
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send message: {}", e);
                        break;
                    }
                }
                Outbound::Close => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => write_task.abort(),
        _ = &mut write_task => read_task.abort(),
    }
}

/// Fan one payload out to the current listeners.
fn deliver(inbound_tx: &broadcast::Sender<String>, payload: String) {
    if inbound_tx.send(payload).is_err() {
        tracing::debug!("No listeners, inbound frame discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> ClientConfig {
        // Port 9 (discard) on localhost is expected to refuse connections.
        ClientConfig::new("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_base_url() {
        // テスト項目: 不正なベース URL では connect がエラーを返す
        // given (前提条件):
        let config = ClientConfig::new("not a url");

        // when (操作):
        let result = connect(&config);

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn test_connect_returns_before_handshake() {
        // テスト項目: connect はハンドシェイク完了を待たずにハンドルを返す
        // given (前提条件):
        let config = unreachable_config();

        // when (操作):
        let client = connect(&config).unwrap();

        // then (期待する結果):
        assert!(client.url().starts_with("ws://127.0.0.1:9/testSock/"));
        assert_ne!(client.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_send_before_open_is_silent() {
        // テスト項目: 接続が開く前の send はエラーを発生させない
        // given (前提条件):
        let client = connect(&unreachable_config()).unwrap();

        // when (操作):
        client.send("Alice", "hello");
        client.send_text("not even json".to_string());

        // then (期待する結果):
        // panic せずに戻ってくれば成功
        assert_ne!(client.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_failed_handshake_ends_in_closed_state() {
        // テスト項目: 接続に失敗すると状態が Closed になり wait_open はエラーになる
        // given (前提条件):
        let client = connect(&unreachable_config()).unwrap();

        // when (操作):
        let result = client.wait_open().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::NotOpen(_))));
        assert_eq!(client.state(), ConnectionState::Closed);
        client.send("Alice", "after close");
    }

    #[tokio::test]
    async fn test_subscription_ends_after_failed_handshake() {
        // テスト項目: 接続が閉じるとサブスクリプションは None を返す
        // given (前提条件):
        let client = connect(&unreachable_config()).unwrap();
        let mut subscription = client.subscribe();

        // when (操作):
        client.wait_closed().await;
        let next = subscription.recv().await;

        // then (期待する結果):
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn test_subscribe_after_close_is_immediately_closed() {
        // テスト項目: 接続終了後に購読したサブスクリプションはすぐに None を返す
        // given (前提条件):
        let client = connect(&unreachable_config()).unwrap();
        client.wait_closed().await;

        // when (操作):
        let mut subscription = client.subscribe();
        let next = subscription.recv().await;

        // then (期待する結果):
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn test_on_message_listener_finishes_when_connection_closes() {
        // テスト項目: 接続が閉じると on_message のリスナータスクが終了する
        // given (前提条件):
        let client = connect(&unreachable_config()).unwrap();
        let listener = client.on_message(|_text| Ok::<(), ClientError>(()));

        // when (操作):
        client.wait_closed().await;
        let joined = tokio::time::timeout(std::time::Duration::from_secs(5), listener).await;

        // then (期待する結果):
        assert!(joined.is_ok());
    }
}
