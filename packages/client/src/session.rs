//! A client's single connection to the relay server.

use chat_relay_shared::{
    config::ClientConfig,
    protocol::{READ_BUFFER_SIZE, decode_payload, decode_text},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
    task::JoinHandle,
};

use crate::{domain::ClientEvent, error::ClientError};

/// Connected session: the write half plus a background reader
///
/// Inbound payloads arrive on the receiver returned by [`ClientSession::connect`].
/// Dropping the session stops the background reader.
pub struct ClientSession {
    name: String,
    writer: OwnedWriteHalf,
    read_task: JoinHandle<()>,
}

impl ClientSession {
    /// Connect to the server and send the display name as the first write.
    ///
    /// # Errors
    ///
    /// * `ClientError::InvalidName` - the name is empty after trimming
    /// * `ClientError::Connect` - the server could not be reached
    /// * `ClientError::Handshake` - the name could not be sent
    pub async fn connect(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidName);
        }

        let address = config.server_address();
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| ClientError::Connect {
                address: address.clone(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY: {}", e);
        }

        let (read_half, mut writer) = stream.into_split();
        writer
            .write_all(name.as_bytes())
            .await
            .map_err(ClientError::Handshake)?;
        tracing::info!("Connected to {} as '{}'", address, name);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let read_task = tokio::spawn(run_inbound(read_half, events_tx));

        Ok((
            Self {
                name: name.to_string(),
                writer,
                read_task,
            },
            events_rx,
        ))
    }

    /// Display name sent in the handshake
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send one message; one stream write per call.
    pub async fn send(&mut self, text: &str) -> Result<(), ClientError> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(ClientError::Send)?;
        tracing::debug!("Sent {} byte(s)", text.len());
        Ok(())
    }

    /// Close the outbound direction.
    ///
    /// The server answers by dropping the connection, after which the event
    /// stream yields `Disconnected`.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.writer.shutdown().await.map_err(ClientError::Send)
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.read_task.abort();
    }
}

/// Read payloads until the connection ends, forwarding them as events.
///
/// Always finishes with `ClientEvent::Disconnected` unless the receiver is
/// already gone.
pub async fn run_inbound<R>(mut reader: R, events: mpsc::UnboundedSender<ClientEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::info!("Server closed the connection");
                break;
            }
            Ok(n) => {
                let payload = decode_payload(&decode_text(&buf[..n]));
                if events.send(ClientEvent::Received(payload)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("Read from server failed: {}", e);
                break;
            }
        }
    }

    let _ = events.send(ClientEvent::Disconnected);
}
