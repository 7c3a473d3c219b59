//! Message formatting utilities for client display.

use chat_relay_shared::{
    protocol::{Payload, SYSTEM_SENDER},
    time::{format_clock_time, format_clock_time_at},
};
use chrono::FixedOffset;

/// Message formatter for client display
///
/// Every line is prefixed with the local wall-clock time:
///
/// ```text
/// [12:34:56] System: Bob joined the chat
/// [12:34:57] Bob: hi
/// [12:34:58] You: hello
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter {
    /// Fixed offset used instead of the local time zone
    offset: Option<FixedOffset>,
}

impl MessageFormatter {
    /// Formatter using the local time zone
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Formatter rendering times at a fixed UTC offset
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    fn clock(&self, at: i64) -> String {
        match &self.offset {
            Some(offset) => format_clock_time_at(at, offset),
            None => format_clock_time(at),
        }
    }

    /// Format a payload received from the server
    pub fn format_payload(&self, payload: &Payload, received_at: i64) -> String {
        match payload {
            Payload::Chat { sender, text } => self.format_chat(sender, text, received_at),
            Payload::System(text) => self.format_system(text, received_at),
        }
    }

    /// `[HH:MM:SS] System: <text>`
    pub fn format_system(&self, text: &str, at: i64) -> String {
        self.format_chat(SYSTEM_SENDER, text, at)
    }

    /// `[HH:MM:SS] <sender>: <text>`
    pub fn format_chat(&self, sender: &str, text: &str, at: i64) -> String {
        format!("[{}] {}: {}", self.clock(at), sender, text)
    }

    /// Local echo of a message this client sent
    pub fn format_own(&self, text: &str, at: i64) -> String {
        self.format_chat("You", text, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-01-01 12:34:56.789 UTC
    const AT: i64 = 1672576496789;

    fn utc_formatter() -> MessageFormatter {
        MessageFormatter::with_offset(FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_format_chat_payload() {
        // テスト項目: 他の参加者のメッセージが "[時刻] 名前: 本文" 形式になる
        // given (前提条件):
        let payload = Payload::Chat {
            sender: "Bob".to_string(),
            text: "hi".to_string(),
        };

        // when (操作):
        let result = utc_formatter().format_payload(&payload, AT);

        // then (期待する結果):
        assert_eq!(result, "[12:34:56] Bob: hi");
    }

    #[test]
    fn test_format_system_payload() {
        // テスト項目: システム通知は System 名義で表示される
        // given (前提条件):
        let payload = Payload::System("Bob joined the chat".to_string());

        // when (操作):
        let result = utc_formatter().format_payload(&payload, AT);

        // then (期待する結果):
        assert_eq!(result, "[12:34:56] System: Bob joined the chat");
    }

    #[test]
    fn test_format_own_message() {
        // テスト項目: 自分が送ったメッセージは You 名義で表示される
        // given (前提条件):
        let text = "hello";

        // when (操作):
        let result = utc_formatter().format_own(text, AT);

        // then (期待する結果):
        assert_eq!(result, "[12:34:56] You: hello");
    }

    #[test]
    fn test_format_uses_configured_offset() {
        // テスト項目: 指定したタイムゾーンで時刻が表示される（JST = UTC+9）
        // given (前提条件):
        let formatter = MessageFormatter::with_offset(FixedOffset::east_opt(9 * 3600).unwrap());

        // when (操作):
        let result = formatter.format_system("Server stopping", AT);

        // then (期待する結果):
        assert_eq!(result, "[21:34:56] System: Server stopping");
    }
}
