//! testsock client.
//!
//! Connects to a SockJS test socket, sends every line typed at the prompt as
//! `{"name": <name>, "str": <line>}` and logs every chat message received.
//! There is no reconnection: when the connection ends, the client exits.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin testsock-client -- --name Alice
//! cargo run --bin testsock-client -- -n Bob --url http://localhost:8080 --transport raw
//! ```

use clap::Parser;

use testsock_client::{ClientConfig, Transport, connect, prompt::run_prompt};
use testsock_shared::{endpoint::DEFAULT_ENDPOINT_PATH, logger::setup_logger};

#[derive(Parser, Debug)]
#[command(name = "testsock-client")]
#[command(about = "SockJS smoke-test client: send and log {name, str} JSON messages", long_about = None)]
struct Args {
    /// Sender name put in every message
    #[arg(short = 'n', long)]
    name: String,

    /// Origin of the server
    #[arg(short = 'u', long, default_value = testsock_client::config::DEFAULT_BASE_URL)]
    url: String,

    /// Endpoint path of the test socket
    #[arg(short = 'p', long, default_value = DEFAULT_ENDPOINT_PATH)]
    path: String,

    /// Transport framing
    #[arg(short = 't', long, value_enum, default_value_t = Transport::SockJs)]
    transport: Transport,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ClientConfig::new(args.url)
        .with_path(&args.path)
        .with_transport(args.transport);

    let client = match connect(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_prompt(&client, &args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
