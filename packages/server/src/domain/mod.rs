//! Domain layer: connection identity, messages, errors and the relay seam.
//!
//! Nothing in here touches a socket. The Registry (infrastructure layer) and
//! the per-connection tasks (relay layer) are built on these types.

mod connection;
mod error;
mod message;
mod relay;

pub use connection::{Connection, ConnectionId, DisplayName};
pub use error::{HandshakeError, RegistryError, RelayError, SendFailure};
pub use message::{Message, Sender, TranscriptEntry};
pub use relay::{MessageRelay, PusherChannel};

#[cfg(test)]
pub use relay::MockMessageRelay;
