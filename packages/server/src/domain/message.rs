//! Messages flowing through the relay.

use chat_relay_shared::protocol::{
    SERVER_SENDER, SYSTEM_SENDER, encode_chat, joined_announcement, left_announcement,
};

use super::DisplayName;

/// Who a message is attributed to on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// A registered member
    Member(DisplayName),
    /// The operator typing on the server console
    Server,
    /// Join/leave announcements
    System,
}

impl Sender {
    pub fn as_str(&self) -> &str {
        match self {
            Sender::Member(name) => name.as_str(),
            Sender::Server => SERVER_SENDER,
            Sender::System => SYSTEM_SENDER,
        }
    }
}

/// A message between decode and fan-out. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Unix timestamp when received (milliseconds)
    pub received_at: i64,
}

impl Message {
    pub fn from_member(name: DisplayName, text: impl Into<String>, received_at: i64) -> Self {
        Self {
            sender: Sender::Member(name),
            text: text.into(),
            received_at,
        }
    }

    pub fn from_server(text: impl Into<String>, received_at: i64) -> Self {
        Self {
            sender: Sender::Server,
            text: text.into(),
            received_at,
        }
    }

    pub fn system(text: impl Into<String>, received_at: i64) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
            received_at,
        }
    }

    /// "`<name>` joined the chat"
    pub fn joined(name: &DisplayName, received_at: i64) -> Self {
        Self::system(joined_announcement(name.as_str()), received_at)
    }

    /// "`<name>` left the chat"
    pub fn left(name: &DisplayName, received_at: i64) -> Self {
        Self::system(left_announcement(name.as_str()), received_at)
    }

    /// Render as the `"<sender>: <text>"` wire payload.
    pub fn to_wire(&self) -> String {
        encode_chat(self.sender.as_str(), &self.text)
    }
}

/// One broadcast as seen by the server operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: Message,
    /// Members registered when the broadcast was taken, excluded sender included
    pub online: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_message_to_wire() {
        // テスト項目: メンバーのメッセージが "<name>: <text>" 形式になる
        // given (前提条件):
        let name = DisplayName::new("Alice").unwrap();
        let message = Message::from_member(name, "hi", 1000);

        // when (操作):
        let wire = message.to_wire();

        // then (期待する結果):
        assert_eq!(wire, "Alice: hi");
    }

    #[test]
    fn test_joined_and_left_announcements() {
        // テスト項目: 参加・退出通知が System 送信者のメッセージになる
        // given (前提条件):
        let name = DisplayName::new("Bob").unwrap();

        // when (操作):
        let joined = Message::joined(&name, 1000);
        let left = Message::left(&name, 2000);

        // then (期待する結果):
        assert_eq!(joined.sender, Sender::System);
        assert_eq!(joined.to_wire(), "System: Bob joined the chat");
        assert_eq!(left.to_wire(), "System: Bob left the chat");
        assert_eq!(left.received_at, 2000);
    }

    #[test]
    fn test_server_message_to_wire() {
        // テスト項目: サーバーコンソールからのメッセージは Server 送信者になる
        // given (前提条件):
        let message = Message::from_server("maintenance at noon", 1000);

        // when (操作):
        let wire = message.to_wire();

        // then (期待する結果):
        assert_eq!(wire, "Server: maintenance at noon");
    }
}
