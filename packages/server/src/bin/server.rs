//! testsock relay server.
//!
//! Broadcasts every message received on the test socket to all connected
//! sessions, the sender included.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin testsock-server
//! cargo run --bin testsock-server -- --host 0.0.0.0 --port 3000 --path /testSock
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use testsock_server::{
    infrastructure::message_pusher::WebSocketMessagePusher, ui::Server,
    usecase::RelayMessageUseCase,
};
use testsock_shared::{endpoint::DEFAULT_ENDPOINT_PATH, logger::setup_logger};

#[derive(Parser, Debug)]
#[command(name = "testsock-server")]
#[command(about = "SockJS relay server for the testsock smoke-test client", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Endpoint path of the test socket
    #[arg(long, default_value = DEFAULT_ENDPOINT_PATH)]
    path: String,

    /// SockJS heartbeat interval in seconds
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 2. UseCases
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(message_pusher.clone()));

    // 3. Server
    let server = Server::new(message_pusher, relay_message_usecase, &args.path)
        .with_heartbeat_interval(Duration::from_secs(args.heartbeat_secs));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
