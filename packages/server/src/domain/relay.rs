//! The seam between per-connection tasks and the membership registry.
//!
//! Reader tasks only need two things from the registry: fan a message out and
//! leave. Depending on this trait instead of the concrete `Registry` keeps the
//! reader state machine testable with a mock.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Connection, ConnectionId, Message};

/// Outbound channel feeding one member's socket writer.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRelay: Send + Sync {
    /// Send `message` to every member except `exclude`.
    ///
    /// Returns the number of members the message was handed to. Recipients
    /// that cannot be reached are evicted, never reported to the caller.
    async fn relay(&self, message: Message, exclude: Option<ConnectionId>) -> usize;

    /// Remove a member. Removing a non-member is a no-op that returns `None`.
    async fn deregister(&self, id: ConnectionId) -> Option<Connection>;
}
