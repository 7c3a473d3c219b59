//! Reading the display name a peer sends as its first payload.

use std::time::Duration;

use chat_relay_shared::protocol::{READ_BUFFER_SIZE, decode_text};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::domain::{DisplayName, HandshakeError};

/// Read exactly one payload and validate it as a display name.
///
/// Whatever a single read returns is the name. If the client's first chat
/// message arrives in the same segment it becomes part of the name; there is
/// no framing to tell them apart.
pub async fn read_handshake<R>(reader: &mut R) -> Result<DisplayName, HandshakeError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let n = reader.read(&mut buf).await?;
    if n == 0 {
        return Err(HandshakeError::Closed);
    }
    DisplayName::new(decode_text(&buf[..n]))
}

/// [`read_handshake`] bounded by `limit`.
pub async fn perform_handshake<R>(
    reader: &mut R,
    limit: Duration,
) -> Result<DisplayName, HandshakeError>
where
    R: AsyncRead + Unpin,
{
    match tokio::time::timeout(limit, read_handshake(reader)).await {
        Ok(result) => result,
        Err(_) => Err(HandshakeError::Timeout(limit)),
    }
}
