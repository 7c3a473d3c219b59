//! In-memory membership registry.
//!
//! ## Responsibilities
//!
//! - Track the live members in join order, keyed by `ConnectionId`
//! - Fan messages out through each member's `PusherChannel`
//! - Evict members whose channel can no longer be written to
//!
//! ## Locking
//!
//! Every operation goes through one `tokio::sync::Mutex`. The lock covers
//! bookkeeping only: `broadcast` copies the recipient list, releases the lock,
//! then sends. Sends are channel pushes; the socket write happens in each
//! member's own task, so a slow peer never holds up the others.
//!
//! ## Transcript
//!
//! Every broadcast is also published, with the member count at snapshot time,
//! to transcript subscribers (the server console).

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};

use crate::domain::{
    Connection, ConnectionId, Message, MessageRelay, PusherChannel, RegistryError, SendFailure,
    TranscriptEntry,
};

/// Entries a slow transcript subscriber may fall behind before it skips ahead
const TRANSCRIPT_CAPACITY: usize = 256;

/// Registry entry: the connection plus the handle used to reach its writer.
///
/// The registry never owns the socket itself.
#[derive(Clone)]
struct Member {
    connection: Connection,
    outbox: PusherChannel,
}

#[derive(Default)]
struct RegistryState {
    members: Vec<Member>,
    closed: bool,
}

impl RegistryState {
    fn position(&self, id: &ConnectionId) -> Option<usize> {
        self.members
            .iter()
            .position(|member| &member.connection.id == id)
    }
}

/// Outcome of a single broadcast
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members the message was handed to
    pub delivered: usize,
    /// Members removed because their outbound channel was closed
    pub evicted: Vec<Connection>,
}

/// The authoritative set of current members
pub struct Registry {
    state: Mutex<RegistryState>,
    transcript: broadcast::Sender<TranscriptEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        let (transcript, _) = broadcast::channel(TRANSCRIPT_CAPACITY);
        Self {
            state: Mutex::new(RegistryState::default()),
            transcript,
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every message broadcast from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEntry> {
        self.transcript.subscribe()
    }

    /// Register a member.
    ///
    /// # Errors
    ///
    /// * `RegistryError::DuplicateMember` - the connection id is already present
    /// * `RegistryError::Closed` - the registry was closed by shutdown
    pub async fn add(
        &self,
        connection: Connection,
        outbox: PusherChannel,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(RegistryError::Closed);
        }
        if state.position(&connection.id).is_some() {
            return Err(RegistryError::DuplicateMember(connection.id));
        }

        tracing::debug!(
            "Member '{}' ({}) registered from {}",
            connection.name,
            connection.id,
            connection.remote_addr
        );
        state.members.push(Member { connection, outbox });
        Ok(())
    }

    /// Remove a member if present.
    ///
    /// Idempotent: removing a non-member, or removing twice, returns `None`.
    pub async fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        let member = state.members.remove(index);
        tracing::debug!("Member '{}' ({}) removed", member.connection.name, id);
        Some(member.connection)
    }

    /// Send `message` to every member except `exclude`.
    ///
    /// The recipient list is a snapshot taken under the lock, so a concurrent
    /// join or leave is either fully in or fully out of this broadcast.
    /// Messages from one sender keep the order in which that sender's reader
    /// handed them over; messages from different senders may interleave in any
    /// order.
    ///
    /// A recipient whose channel is closed is evicted before this returns. Its
    /// failure is not reported to the caller. After `close()` nothing is sent.
    pub async fn broadcast(
        &self,
        message: &Message,
        exclude: Option<&ConnectionId>,
    ) -> BroadcastReport {
        let targets: Vec<Member> = {
            let state = self.state.lock().await;
            if state.closed {
                return BroadcastReport::default();
            }
            // No subscribers is fine
            let _ = self.transcript.send(TranscriptEntry {
                message: message.clone(),
                online: state.members.len(),
            });
            state
                .members
                .iter()
                .filter(|member| Some(&member.connection.id) != exclude)
                .cloned()
                .collect()
        };

        let payload = message.to_wire();
        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        for target in targets {
            match target.outbox.send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    let failure = SendFailure::ChannelClosed(target.connection.name.to_string());
                    tracing::warn!("Evicting member '{}': {}", target.connection.name, failure);
                    failed.push(target.connection.id);
                }
            }
        }

        if !failed.is_empty() {
            let mut state = self.state.lock().await;
            for id in failed {
                if let Some(index) = state.position(&id) {
                    report.evicted.push(state.members.remove(index).connection);
                }
            }
        }

        report
    }

    /// Number of current members
    pub async fn count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    /// Display names of current members, in join order
    pub async fn list_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .members
            .iter()
            .map(|member| member.connection.name.to_string())
            .collect()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Close the registry and drain every member.
    ///
    /// Dropping the drained outbound channels ends each member's writer, which
    /// in turn drives its reader to `Closed`. Later `add` calls fail and later
    /// broadcasts send nothing. Calling this again returns an empty list.
    pub async fn close(&self) -> Vec<Connection> {
        let mut state = self.state.lock().await;
        state.closed = true;
        state
            .members
            .drain(..)
            .map(|member| member.connection)
            .collect()
    }
}

#[async_trait]
impl MessageRelay for Registry {
    async fn relay(&self, message: Message, exclude: Option<ConnectionId>) -> usize {
        self.broadcast(&message, exclude.as_ref()).await.delivered
    }

    async fn deregister(&self, id: ConnectionId) -> Option<Connection> {
        self.remove(&id).await
    }
}
