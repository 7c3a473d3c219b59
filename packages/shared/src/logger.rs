//! Logging setup utilities for the chat relay binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are enabled at the default level.
const WORKSPACE_CRATES: &[&str] = &["chat_relay_shared", "chat_relay_server", "chat_relay_client"];

/// Initialize the tracing subscriber with the specified default log level.
///
/// This function sets up logging for every workspace crate and the binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// Events are written to stderr: stdout belongs to the interactive console and
/// the chat transcript.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "chat-relay-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use chat_relay_shared::logger::setup_logger;
///
/// setup_logger("chat-relay-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the `EnvFilter` directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut directives: Vec<String> = WORKSPACE_CRATES
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect();

    if !WORKSPACE_CRATES.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }

    directives.join(",")
}
