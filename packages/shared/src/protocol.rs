//! Plain-text wire protocol spoken between the relay server and its clients.
//!
//! There is no framing: every application-level send is one UTF-8 stream
//! write, and one read on the other side is treated as one payload.
//!
//! - Handshake: the client's first write is exactly its display name.
//! - Relayed chat: the server writes `"<name>: <text>"`.
//! - Announcements: the server writes `"System: <text>"`.
//!
//! Neither names nor texts are escaped, so a name containing `": "` is
//! mis-parsed on the receiving side. The format is kept as-is for
//! compatibility with existing peers.

/// Size of the buffer used for a single read from a peer.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Sender name used for join/leave announcements.
pub const SYSTEM_SENDER: &str = "System";

/// Sender name used for messages typed on the server console.
pub const SERVER_SENDER: &str = "Server";

/// Separator between the sender name and the text of a relayed message.
pub const SEPARATOR: &str = ": ";

/// A payload received by a client, after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A message relayed from a named sender
    Chat { sender: String, text: String },
    /// An announcement, displayed verbatim
    System(String),
}

/// Encode a relayed message as `"<sender>: <text>"`.
pub fn encode_chat(sender: &str, text: &str) -> String {
    format!("{}{}{}", sender, SEPARATOR, text)
}

/// Encode a system announcement as `"System: <text>"`.
pub fn encode_system(text: &str) -> String {
    encode_chat(SYSTEM_SENDER, text)
}

/// Text announced to the other members when `name` joins.
pub fn joined_announcement(name: &str) -> String {
    format!("{} joined the chat", name)
}

/// Text announced to the remaining members when `name` leaves.
pub fn left_announcement(name: &str) -> String {
    format!("{} left the chat", name)
}

/// Parse a payload received from the server.
///
/// The payload is split on the first `": "`. A payload without the separator,
/// or whose sender is `System`, is an announcement. Parsing never fails.
pub fn decode_payload(payload: &str) -> Payload {
    match payload.split_once(SEPARATOR) {
        Some((sender, text)) if sender != SYSTEM_SENDER => Payload::Chat {
            sender: sender.to_string(),
            text: text.to_string(),
        },
        Some((_, text)) => Payload::System(text.to_string()),
        None => Payload::System(payload.to_string()),
    }
}

/// Decode raw bytes read from a socket into text.
///
/// Invalid UTF-8 sequences (including a multi-byte character cut by a read
/// boundary) are replaced with U+FFFD instead of failing the connection.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
