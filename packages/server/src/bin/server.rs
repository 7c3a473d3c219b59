//! TCP chat relay server.
//!
//! Accepts peers, reads each one's display name, and rebroadcasts every
//! message to all other connected peers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chat-relay-server
//! cargo run --bin chat-relay-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin chat-relay-server -- --headless
//! ```

use std::time::Duration;

use chat_relay_server::{
    relay::{RelayServer, shutdown_signal},
    ui::{print_transcript, run_console},
};
use chat_relay_shared::{
    config::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig},
    logger::setup_logger,
    time::{format_clock_time, get_timestamp},
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chat-relay-server")]
#[command(about = "Multi-client TCP chat relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to (0 picks a free port)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds a new peer has to send its display name
    #[arg(long, default_value_t = 10)]
    handshake_timeout_secs: u64,

    /// Milliseconds shutdown waits for in-flight sends
    #[arg(long, default_value_t = 2000)]
    shutdown_grace_millis: u64,

    /// Run without the interactive console until Ctrl+C / SIGTERM
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn to_config(&self) -> ServerConfig {
        ServerConfig {
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            shutdown_grace: Duration::from_millis(self.shutdown_grace_millis),
            ..ServerConfig::new(self.host.clone(), self.port)
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let server = match RelayServer::start(&args.to_config()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "[{}] System: Server started on {}",
        format_clock_time(get_timestamp()),
        server.local_addr()
    );

    let transcript = tokio::spawn(print_transcript(server.subscribe()));

    if args.headless {
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        shutdown_signal().await;
    } else {
        println!("Type /users to list members, /quit to stop the server.");
        run_console(&server).await;
    }

    server.shutdown().await;
    transcript.abort();
    println!(
        "[{}] System: Server stopped",
        format_clock_time(get_timestamp())
    );
}
