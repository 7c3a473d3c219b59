//! Error types for the relay server.

use std::{io, time::Duration};

use thiserror::Error;

use super::ConnectionId;

/// Errors that prevent the relay server from starting
#[derive(Debug, Error)]
pub enum RelayError {
    /// The listening socket could not be opened
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The bound socket did not report its local address
    #[error("Failed to read local address: {0}")]
    LocalAddr(#[source] io::Error),
}

/// Registry membership errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The same transport identity is already registered
    #[error("Connection '{0}' is already a member")]
    DuplicateMember(ConnectionId),

    /// The registry was closed by shutdown
    #[error("Registry is closed")]
    Closed,
}

/// Reasons a newly accepted connection is dropped before registration
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Display name is empty")]
    EmptyName,

    #[error("Display name '{0}' is reserved")]
    ReservedName(String),

    #[error("Connection closed before handshake")]
    Closed,

    #[error("Handshake read failed: {0}")]
    Io(#[from] io::Error),

    #[error("No handshake received within {0:?}")]
    Timeout(Duration),
}

/// A write towards one member failed
#[derive(Debug, Error)]
pub enum SendFailure {
    /// The member's outbound channel is gone (its writer has finished)
    #[error("Outbound channel of '{0}' is closed")]
    ChannelClosed(String),

    #[error("Write to peer failed: {0}")]
    Write(#[from] io::Error),
}
