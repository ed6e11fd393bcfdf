//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use testsock_shared::endpoint::normalize_path;

use crate::{domain::MessagePusher, usecase::RelayMessageUseCase};

use super::{
    handler::{raw_websocket_handler, sockjs_info, sockjs_websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// SockJS servers send a heartbeat frame every 25 seconds by default.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Relay server hosting the test socket endpoint
///
/// # Example
///
/// ```ignore
/// let pusher = Arc::new(WebSocketMessagePusher::default());
/// let relay = Arc::new(RelayMessageUseCase::new(pusher.clone()));
/// let server = Server::new(pusher, relay, "/testSock");
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    message_pusher: Arc<dyn MessagePusher>,
    relay_message_usecase: Arc<RelayMessageUseCase>,
    endpoint_path: String,
    heartbeat_interval: Duration,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `message_pusher` - Session registry used for broadcasts
    /// * `relay_message_usecase` - UseCase for relaying inbound payloads
    /// * `endpoint_path` - Path the socket endpoint is mounted at (e.g. "/testSock")
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        endpoint_path: &str,
    ) -> Self {
        Self {
            message_pusher,
            relay_message_usecase,
            endpoint_path: normalize_path(endpoint_path),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Override the heartbeat interval. Zero is raised to one millisecond.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }

    /// Build the router with every endpoint route mounted under the endpoint path.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            message_pusher: self.message_pusher.clone(),
            relay_message_usecase: self.relay_message_usecase.clone(),
            heartbeat_interval: self.heartbeat_interval,
        });

        let path = &self.endpoint_path;
        Router::new()
            .route(&format!("{}/info", path), get(sockjs_info))
            .route(&format!("{}/websocket", path), get(raw_websocket_handler))
            .route(
                &format!("{}/{{server_id}}/{{session_id}}/websocket", path),
                get(sockjs_websocket_handler),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until the task is dropped.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app).await
    }

    /// Run the relay server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("testsock relay listening on {}", listener.local_addr()?);
        tracing::info!(
            "SockJS endpoint: http://{}{} (raw: ws://{}{}/websocket)",
            bind_addr,
            self.endpoint_path,
            bind_addr,
            self.endpoint_path
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
