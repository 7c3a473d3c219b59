//! Runtime configuration shared by the server and client binaries.

use std::time::Duration;

/// Default host for both binding and connecting.
pub const DEFAULT_HOST: &str = "localhost";

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 12345;

/// Default time a newly accepted peer has to send its display name.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time shutdown waits for in-flight sends before forcing transports closed.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Relay server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to bind to (0 for an ephemeral port)
    pub port: u16,
    /// Maximum wait for the handshake payload
    pub handshake_timeout: Duration,
    /// Grace period for in-flight sends during shutdown
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Create a configuration for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port` string passed to the socket layer.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host to connect to
    pub host: String,
    /// Server port to connect to
    pub port: u16,
    /// Display name sent as the handshake
    pub name: String,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
        }
    }

    /// `host:port` string passed to the socket layer.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        // テスト項目: サーバー設定のデフォルト値が localhost:12345 になる
        // given (前提条件):

        // when (操作):
        let config = ServerConfig::default();

        // then (期待する結果):
        assert_eq!(config.bind_address(), "localhost:12345");
        assert_eq!(config.handshake_timeout, DEFAULT_HANDSHAKE_TIMEOUT);
        assert_eq!(config.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[test]
    fn test_server_config_new_keeps_default_timeouts() {
        // テスト項目: ホストとポートを指定してもタイムアウトはデフォルトのまま
        // given (前提条件):
        let host = "127.0.0.1";

        // when (操作):
        let config = ServerConfig::new(host, 0);

        // then (期待する結果):
        assert_eq!(config.bind_address(), "127.0.0.1:0");
        assert_eq!(config.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[test]
    fn test_client_config_server_address() {
        // テスト項目: クライアント設定から接続先アドレスが組み立てられる
        // given (前提条件):
        let config = ClientConfig::new("localhost", 4000, "Alice");

        // when (操作):
        let address = config.server_address();

        // then (期待する結果):
        assert_eq!(address, "localhost:4000");
        assert_eq!(config.name, "Alice");
    }
}
