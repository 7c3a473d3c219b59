//! Per-connection receive loop.
//!
//! ## State machine
//!
//! ```text
//! Active --payload--> Active
//! Active --empty read / read error / cancelled--> Closed
//! ```
//!
//! On entering `Closed` the task deregisters its connection, announces the
//! departure to everyone left, and returns. Dropping the task drops its read
//! half; the write half belongs to the writer future passed as `cancelled`.

use std::{io, sync::Arc};

use chat_relay_shared::{
    protocol::{READ_BUFFER_SIZE, decode_text},
    time::Clock,
};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::domain::{Connection, Message, MessageRelay};

/// Why a reader left the `Active` state
#[derive(Debug)]
pub enum CloseReason {
    /// The peer closed its side (a read returned no bytes)
    PeerClosed,
    /// A read failed; not retried
    ReadFailure(io::Error),
    /// The connection's writer finished (eviction, shutdown, or a failed write)
    Cancelled,
}

enum ReadEvent {
    Payload(String),
    Closed(CloseReason),
}

pub struct ReaderTask<R> {
    reader: R,
    connection: Connection,
    relay: Arc<dyn MessageRelay>,
    clock: Arc<dyn Clock>,
}

impl<R> ReaderTask<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(
        reader: R,
        connection: Connection,
        relay: Arc<dyn MessageRelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reader,
            connection,
            relay,
            clock,
        }
    }

    /// Run until the peer goes away or `cancelled` resolves.
    ///
    /// Each payload is relayed to every other member before the next read
    /// starts, so one sender's messages keep their order.
    pub async fn run<F>(mut self, cancelled: F) -> CloseReason
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancelled);
        let mut buf = [0u8; READ_BUFFER_SIZE];

        let reason = loop {
            let event = tokio::select! {
                result = self.reader.read(&mut buf) => match result {
                    Ok(0) => ReadEvent::Closed(CloseReason::PeerClosed),
                    Ok(n) => ReadEvent::Payload(decode_text(&buf[..n])),
                    Err(e) => ReadEvent::Closed(CloseReason::ReadFailure(e)),
                },
                _ = &mut cancelled => ReadEvent::Closed(CloseReason::Cancelled),
            };

            match event {
                ReadEvent::Payload(text) => self.handle_payload(text).await,
                ReadEvent::Closed(reason) => break reason,
            }
        };

        self.close(&reason).await;
        reason
    }

    async fn handle_payload(&self, text: String) {
        let message =
            Message::from_member(self.connection.name.clone(), text, self.clock.now_millis());
        tracing::debug!("{}", message.to_wire());
        let delivered = self.relay.relay(message, Some(self.connection.id)).await;
        tracing::debug!(
            "Relayed message from '{}' to {} member(s)",
            self.connection.name,
            delivered
        );
    }

    async fn close(&self, reason: &CloseReason) {
        match reason {
            CloseReason::PeerClosed => {
                tracing::info!("'{}' disconnected", self.connection.name)
            }
            CloseReason::ReadFailure(e) => {
                tracing::warn!("Read from '{}' failed: {}", self.connection.name, e)
            }
            CloseReason::Cancelled => {
                tracing::info!("Connection of '{}' closed by server", self.connection.name)
            }
        }

        self.relay.deregister(self.connection.id).await;
        let left = Message::left(&self.connection.name, self.clock.now_millis());
        self.relay.relay(left, None).await;
    }
}
