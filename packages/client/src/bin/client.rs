//! TCP chat relay client.
//!
//! Connects once, sends the display name, then sends every typed line and
//! prints every message relayed by the server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chat-relay-client -- --name Alice
//! cargo run --bin chat-relay-client -- -n Bob -H 127.0.0.1 -p 12345
//! ```

use chat_relay_client::run_client;
use chat_relay_shared::{
    config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT},
    logger::setup_logger,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chat-relay-client")]
#[command(about = "Multi-client TCP chat relay client", long_about = None)]
struct Args {
    /// Display name announced to the other members
    #[arg(short = 'n', long, default_value = "Anonymous")]
    name: String,

    /// Server host to connect to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port to connect to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(ClientConfig::new(args.host, args.port, args.name)).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
