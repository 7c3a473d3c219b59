//! Connection identity and display names.

use std::{fmt, net::SocketAddr};

use chat_relay_shared::protocol::SYSTEM_SENDER;
use uuid::Uuid;

use super::HandshakeError;

/// Transport identity of an accepted peer.
///
/// Generated once per accepted socket; two connections never share one even if
/// they pick the same display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name declared by a peer in its handshake.
///
/// Surrounding whitespace is trimmed. Empty names and the reserved `System`
/// sender are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, HandshakeError> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(HandshakeError::EmptyName);
        }
        if name == SYSTEM_SENDER {
            return Err(HandshakeError::ReservedName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = HandshakeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered peer: the unit of membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// Fixed once the handshake completes
    pub name: DisplayName,
    pub remote_addr: SocketAddr,
    /// Unix timestamp when registered (milliseconds)
    pub connected_at: i64,
}

impl Connection {
    /// Create a connection with a freshly generated id
    pub fn new(name: DisplayName, remote_addr: SocketAddr, connected_at: i64) -> Self {
        Self {
            id: ConnectionId::generate(),
            name,
            remote_addr,
            connected_at,
        }
    }
}
