//! Client-side events and commands.

use chat_relay_shared::protocol::Payload;

/// Something that happened on the inbound side of the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// One payload read from the server
    Received(Payload),
    /// The connection is gone; no further events follow
    Disconnected,
}

/// A line typed at the client prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Quit,
    Send(String),
    Ignore,
}

pub fn parse_input(line: &str) -> InputCommand {
    match line.trim() {
        "" => InputCommand::Ignore,
        "/quit" => InputCommand::Quit,
        text => InputCommand::Send(text.to_string()),
    }
}
