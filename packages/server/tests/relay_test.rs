//! Integration tests for the relay server endpoints.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use testsock_server::{
    infrastructure::message_pusher::WebSocketMessagePusher, ui::Server,
    usecase::RelayMessageUseCase,
};
use testsock_shared::SockJsFrame;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Start a relay on an ephemeral port and return `host:port`.
async fn start_relay(heartbeat: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    let pusher = Arc::new(WebSocketMessagePusher::default());
    let relay = Arc::new(RelayMessageUseCase::new(pusher.clone()));
    let server = Server::new(pusher, relay, "/testSock").with_heartbeat_interval(heartbeat);
    tokio::spawn(server.serve(listener));

    addr.to_string()
}

async fn next_text(socket: &mut Socket) -> String {
    loop {
        let message = timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = message {
            return text.to_string();
        }
    }
}

async fn open_sockjs(addr: &str, session: &str) -> Socket {
    let url = format!("ws://{}/testSock/123/{}/websocket", addr, session);
    let (mut socket, _) = connect_async(url.as_str()).await.expect("Failed to connect");
    assert_eq!(next_text(&mut socket).await, "o");
    socket
}

#[tokio::test]
async fn test_info_endpoint_advertises_websocket() {
    // テスト項目: info エンドポイントが websocket 対応を返す
    // given (前提条件):
    let addr = start_relay(Duration::from_secs(25)).await;

    // when (操作):
    let response = reqwest::get(format!("http://{}/testSock/info", addr))
        .await
        .expect("Failed to call info");

    // then (期待する結果):
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["websocket"], true);
    assert_eq!(body["cookie_needed"], false);
    assert_eq!(body["origins"], serde_json::json!(["*:*"]));
    assert!(body["entropy"].is_u64());
}

#[tokio::test]
async fn test_sockjs_session_receives_its_own_message_in_array_frame() {
    // テスト項目: SockJS セッションが送ったメッセージが a[...] フレームで本人にも届く
    // given (前提条件):
    let addr = start_relay(Duration::from_secs(25)).await;
    let mut socket = open_sockjs(&addr, "abcdefgh").await;
    let payload = r#"{"name":"Alice","str":"hello"}"#;

    // when (操作):
    socket
        .send(Message::Text(
            testsock_shared::sockjs::encode_client_messages(&[payload]).into(),
        ))
        .await
        .unwrap();

    // then (期待する結果):
    let frame = SockJsFrame::decode(&next_text(&mut socket).await).unwrap();
    assert_eq!(frame, SockJsFrame::Messages(vec![payload.to_string()]));
}

#[tokio::test]
async fn test_raw_payload_is_broadcast_to_sockjs_session() {
    // テスト項目: raw セッションのペイロードが SockJS セッションに中継される
    // given (前提条件):
    let addr = start_relay(Duration::from_secs(25)).await;
    let mut sockjs = open_sockjs(&addr, "session1").await;
    let (mut raw, _) = connect_async(format!("ws://{}/testSock/websocket", addr).as_str())
        .await
        .expect("Failed to connect raw");
    let payload = r#"{"name":"Raw","str":"hi"}"#;

    // when (操作):
    raw.send(Message::Text(payload.into())).await.unwrap();

    // then (期待する結果):
    assert_eq!(next_text(&mut raw).await, payload);
    let frame = SockJsFrame::decode(&next_text(&mut sockjs).await).unwrap();
    assert_eq!(frame, SockJsFrame::Messages(vec![payload.to_string()]));
}

#[tokio::test]
async fn test_sockjs_session_receives_heartbeats() {
    // テスト項目: アイドル状態の SockJS セッションにハートビートが送られる
    // given (前提条件):
    let addr = start_relay(Duration::from_millis(100)).await;

    // when (操作):
    let mut socket = open_sockjs(&addr, "idle0001").await;

    // then (期待する結果):
    assert_eq!(next_text(&mut socket).await, "h");
}

#[tokio::test]
async fn test_malformed_sockjs_frame_keeps_session_alive() {
    // テスト項目: 壊れた SockJS フレームを送ってもセッションは維持される
    // given (前提条件):
    let addr = start_relay(Duration::from_secs(25)).await;
    let mut socket = open_sockjs(&addr, "broken01").await;

    // when (操作):
    socket.send(Message::Text("{not-an-array".into())).await.unwrap();
    socket
        .send(Message::Text(r#"["after"]"#.into()))
        .await
        .unwrap();

    // then (期待する結果):
    let frame = SockJsFrame::decode(&next_text(&mut socket).await).unwrap();
    assert_eq!(frame, SockJsFrame::Messages(vec!["after".to_string()]));
}
