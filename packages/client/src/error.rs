//! Error types for the chat client.

use std::io;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Display name is empty after trimming
    #[error("Display name must not be empty")]
    InvalidName,

    /// The server could not be reached. Never retried.
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Sending the display name failed
    #[error("Handshake failed: {0}")]
    Handshake(#[source] io::Error),

    /// Writing a message to the server failed
    #[error("Failed to send message: {0}")]
    Send(#[source] io::Error),
}
