//! The relay server: listening socket, accept loop and per-connection tasks.
//!
//! ## Lifecycle
//!
//! 1. `start` binds the listener and spawns the accept loop
//! 2. Each accepted socket gets its own task: handshake, register, announce
//!    the join, then run the reader and writer until either ends
//! 3. `shutdown` stops accepting, closes the registry, and gives the
//!    connection tasks a grace period before aborting them

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use chat_relay_shared::{
    config::ServerConfig,
    time::{Clock, SystemClock},
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream},
    sync::{
        Mutex, broadcast,
        mpsc::{self, UnboundedReceiver},
        watch,
    },
    task::{JoinHandle, JoinSet},
};

use crate::{
    domain::{Connection, Message, MessageRelay, RelayError, TranscriptEntry},
    infrastructure::Registry,
};

use super::{
    handshake::perform_handshake,
    reader::{CloseReason, ReaderTask},
    writer::run_writer,
};

/// Pause after a failed `accept` so a persistent error (e.g. EMFILE) does not spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A running relay server
///
/// # Example
///
/// ```ignore
/// let server = RelayServer::start(&ServerConfig::new("127.0.0.1", 0)).await?;
/// println!("listening on {}", server.local_addr());
/// server.shutdown().await;
/// ```
pub struct RelayServer {
    local_addr: SocketAddr,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl RelayServer {
    /// Bind `config.host:config.port` and start accepting peers.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Bind` if the address is unavailable.
    pub async fn start(config: &ServerConfig) -> Result<Self, RelayError> {
        Self::start_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Same as [`RelayServer::start`] with an injected clock for timestamps.
    pub async fn start_with_clock(
        config: &ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RelayError> {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| RelayError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(RelayError::LocalAddr)?;
        tracing::info!("Relay server listening on {}", local_addr);

        let registry = Arc::new(Registry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let accept_loop = AcceptLoop {
            listener,
            registry: registry.clone(),
            clock: clock.clone(),
            handshake_timeout: config.handshake_timeout,
            shutdown_grace: config.shutdown_grace,
        };
        let accept_task = tokio::spawn(accept_loop.run(shutdown_rx));

        Ok(Self {
            local_addr,
            registry,
            clock,
            shutdown_tx,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }

    /// The address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Number of registered members
    pub async fn count(&self) -> usize {
        self.registry.count().await
    }

    /// Names of registered members, in join order
    pub async fn list_names(&self) -> Vec<String> {
        self.registry.list_names().await
    }

    /// Every broadcast from now on, for the operator's transcript
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEntry> {
        self.registry.subscribe()
    }

    /// Broadcast an operator message to every member as `"Server: <text>"`.
    ///
    /// Returns the number of members it was handed to.
    pub async fn announce(&self, text: &str) -> usize {
        let message = Message::from_server(text, self.clock.now_millis());
        tracing::info!("{}", message.to_wire());
        self.registry.broadcast(&message, None).await.delivered
    }

    /// Stop accepting, disconnect every member and wait for the connection
    /// tasks (up to the configured grace period). Safe to call more than once.
    pub async fn shutdown(&self) {
        let Some(accept_task) = self.accept_task.lock().await.take() else {
            return;
        };

        tracing::info!("Shutting down relay server");
        // The accept loop may already be gone; the join below covers that case.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = accept_task.await {
            tracing::error!("Accept loop ended abnormally: {}", e);
        }
        tracing::info!("Relay server shutdown complete");
    }
}

struct AcceptLoop {
    listener: TcpListener,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    handshake_timeout: Duration,
    shutdown_grace: Duration,
}

impl AcceptLoop {
    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        connections.spawn(serve_connection(
                            stream,
                            peer,
                            self.registry.clone(),
                            self.clock.clone(),
                            self.handshake_timeout,
                        ));
                    }
                    Err(e) => backoff_after_accept_error(&e).await,
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!("Connection task ended abnormally: {}", e);
                    }
                }
            }
        }

        drop(self.listener);

        let drained = self.registry.close().await;
        tracing::info!("Disconnecting {} member(s)", drained.len());
        drop(drained);

        let drain_all = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(self.shutdown_grace, drain_all)
            .await
            .is_err()
        {
            tracing::warn!(
                "{} connection task(s) still running after {:?}, aborting",
                connections.len(),
                self.shutdown_grace
            );
            connections.shutdown().await;
        }
    }
}

async fn backoff_after_accept_error(e: &io::Error) {
    tracing::warn!("Failed to accept connection: {}", e);
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Everything one accepted socket goes through, from handshake to teardown.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    handshake_timeout: Duration,
) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
    }
    let (mut read_half, write_half) = stream.into_split();

    let name = match perform_handshake(&mut read_half, handshake_timeout).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Dropping connection from {}: {}", peer, e);
            return;
        }
    };

    let connection = Connection::new(name, peer, clock.now_millis());
    let (outbox, inbox) = mpsc::unbounded_channel();
    if let Err(e) = registry.add(connection.clone(), outbox).await {
        tracing::warn!("Could not register '{}': {}", connection.name, e);
        return;
    }
    tracing::info!("'{}' joined from {}", connection.name, peer);

    let joined = Message::joined(&connection.name, clock.now_millis());
    registry.broadcast(&joined, Some(&connection.id)).await;
    let reason = run_member(read_half, write_half, inbox, connection, registry, clock).await;
    tracing::debug!("Connection from {} closed: {:?}", peer, reason);
}

/// Run a registered member until either direction ends.
///
/// The writer drains `inbox` into `write_half`. When it finishes, because the
/// registry dropped the outbox or a socket write failed, the reader closes as
/// `Cancelled`, deregisters the member and announces the departure.
async fn run_member<R, W>(
    read_half: R,
    write_half: W,
    inbox: UnboundedReceiver<String>,
    connection: Connection,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
) -> CloseReason
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let name = connection.name.clone();
    let writer = async move {
        if let Err(e) = run_writer(write_half, inbox).await {
            tracing::warn!("Writing to '{}' failed: {}", name, e);
        }
    };

    let relay: Arc<dyn MessageRelay> = registry;
    ReaderTask::new(read_half, connection, relay, clock)
        .run(writer)
        .await
}
