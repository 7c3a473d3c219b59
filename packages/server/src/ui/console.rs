//! Interactive server console.
//!
//! - `/quit` stops the server
//! - `/users` lists the connected members
//! - anything else is broadcast to every member as `Server: <text>`
//!
//! End of input on the console behaves like `/quit`.
//!
//! Alongside the prompt the console prints a transcript of every broadcast:
//! chat lines as `[HH:MM:SS] name: text`, joins and leaves with the number of
//! users online.

use chat_relay_shared::time::format_clock_time;
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::{
    domain::{Sender, TranscriptEntry},
    relay::{RelayServer, shutdown_signal},
};

const PROMPT: &str = "> ";

/// A line typed on the server console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Quit,
    Users,
    Announce(String),
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => ConsoleCommand::Empty,
            "/quit" => ConsoleCommand::Quit,
            "/users" => ConsoleCommand::Users,
            text => ConsoleCommand::Announce(text.to_string()),
        }
    }
}

/// `Connected users (N): a, b`
pub fn format_user_list(names: &[String]) -> String {
    format!("Connected users ({}): {}", names.len(), names.join(", "))
}

/// Render one transcript entry for the operator.
///
/// `time` is the already formatted `HH:MM:SS` of the entry.
pub fn format_transcript_line(entry: &TranscriptEntry, time: &str) -> String {
    let message = &entry.message;
    match &message.sender {
        Sender::Member(name) => format!("[{}] {}: {}", time, name, message.text),
        Sender::Server => format!("[{}] You: {}", time, message.text),
        Sender::System => format!(
            "[{}] System: {} (Users online: {})",
            time, message.text, entry.online
        ),
    }
}

/// Print every transcript entry until the relay stops publishing.
pub async fn print_transcript(mut transcript: Receiver<TranscriptEntry>) {
    loop {
        match transcript.recv().await {
            Ok(entry) => {
                let time = format_clock_time(entry.message.received_at);
                println!("{}", format_transcript_line(&entry, &time));
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Console transcript skipped {} message(s)", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Run the console until `/quit`, end of input, or a shutdown signal.
///
/// Does not shut the server down; the caller does that afterwards.
pub async fn run_console(server: &RelayServer) {
    let mut input_rx = chat_relay_shared::input::spawn_line_reader(PROMPT);
    let signal = shutdown_signal();
    tokio::pin!(signal);

    loop {
        let line = tokio::select! {
            line = input_rx.recv() => line,
            _ = &mut signal => break,
        };

        let command = match line {
            Some(line) => ConsoleCommand::parse(&line),
            None => ConsoleCommand::Quit,
        };

        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Users => {
                let names = server.list_names().await;
                println!("{}", format_user_list(&names));
            }
            ConsoleCommand::Announce(text) => {
                let delivered = server.announce(&text).await;
                tracing::debug!("Announcement handed to {} member(s)", delivered);
            }
            ConsoleCommand::Empty => {}
        }
    }
}
