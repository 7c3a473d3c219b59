//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix timestamp (milliseconds) as `HH:MM:SS` in the local time zone.
///
/// This is the prefix the consoles print in front of every chat line.
pub fn format_clock_time(timestamp_millis: i64) -> String {
    match to_datetime(&Local, timestamp_millis) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// Render a Unix timestamp (milliseconds) as `HH:MM:SS` at a fixed UTC offset.
pub fn format_clock_time_at(timestamp_millis: i64, offset: &FixedOffset) -> String {
    match to_datetime(offset, timestamp_millis) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

fn to_datetime<Tz: TimeZone>(tz: &Tz, timestamp_millis: i64) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(timestamp_millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        // テスト項目: SystemClock が 0 以外のタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp > 0);
    }

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // テスト項目: SystemClock が呼び出すたびに増加するタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let timestamp2 = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp2 >= timestamp1);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        // テスト項目: FixedClock が固定されたタイムスタンプを返す
        // given (前提条件):
        let fixed_time = 1234567890123;
        let clock = FixedClock::new(fixed_time);

        // when (操作):
        let timestamp1 = clock.now_millis();
        let timestamp2 = clock.now_millis();

        // then (期待する結果):
        assert_eq!(timestamp1, fixed_time);
        assert_eq!(timestamp2, fixed_time);
    }

    #[test]
    fn test_format_clock_time_at_utc() {
        // テスト項目: UTC オフセットで HH:MM:SS 形式に変換される
        // given (前提条件):
        // 2023-01-01 12:34:56.789 UTC in milliseconds
        let timestamp = 1672576496789;
        let utc = FixedOffset::east_opt(0).unwrap();

        // when (操作):
        let result = format_clock_time_at(timestamp, &utc);

        // then (期待する結果):
        assert_eq!(result, "12:34:56");
    }

    #[test]
    fn test_format_clock_time_at_positive_offset() {
        // テスト項目: 正のオフセット（JST）で日付をまたいだ時刻が正しく変換される
        // given (前提条件):
        let timestamp = 1672576496789;
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();

        // when (操作):
        let result = format_clock_time_at(timestamp, &jst);

        // then (期待する結果):
        assert_eq!(result, "21:34:56");
    }

    #[test]
    fn test_format_clock_time_local_shape() {
        // テスト項目: ローカル時刻が HH:MM:SS 形式で返される
        // given (前提条件):
        let timestamp = get_timestamp();

        // when (操作):
        let result = format_clock_time(timestamp);

        // then (期待する結果):
        assert_eq!(result.len(), 8);
        assert_eq!(result.chars().filter(|c| *c == ':').count(), 2);
    }
}
