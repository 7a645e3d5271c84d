//! WebSocket listener and connections on top of `tokio-tungstenite`.
//!
//! Each accepted stream is split into its write and read halves, each
//! behind its own lock, so a reply can go out while another task is
//! parked in [`Connection::recv`].

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Transport, TransportError};

type Outgoing = SplitSink<WebSocketStream<TcpStream>, Message>;
type Incoming = SplitStream<WebSocketStream<TcpStream>>;

/// A WebSocket [`Transport`] listening on a TCP socket.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds the listener.
    ///
    /// Pass port `0` to let the OS pick a free port, then read it back
    /// with [`Transport::local_addr`].
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    async fn upgrade(
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<WebSocketConnection, TransportError> {
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|source| TransportError::Handshake { peer, source })?;
        let (outgoing, incoming) = ws.split();

        Ok(WebSocketConnection {
            id: ConnectionId::next(),
            peer,
            outgoing: Mutex::new(outgoing),
            incoming: Mutex::new(incoming),
        })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = Self::upgrade(stream, peer).await?;
        tracing::debug!(conn_id = %conn.id, %peer, "WebSocket upgrade complete");
        Ok(conn)
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener.local_addr().map_err(TransportError::LocalAddr)
    }
}

/// One upgraded WebSocket peer.
///
/// Frames that are valid UTF-8 go out as text frames so browser clients
/// can read JSON replies without decoding a `Blob`.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    outgoing: Mutex<Outgoing>,
    incoming: Mutex<Incoming>,
}

/// Picks the frame type for an outgoing payload.
fn frame_for(data: &[u8]) -> Message {
    match std::str::from_utf8(data) {
        Ok(text) => Message::text(text.to_owned()),
        Err(_) => Message::binary(data.to_vec()),
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let peer = self.peer;
        self.outgoing
            .lock()
            .await
            .send(frame_for(data))
            .await
            .map_err(|source| TransportError::Send { peer, source })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut incoming = self.incoming.lock().await;

        while let Some(frame) = incoming.next().await {
            let frame = frame.map_err(|source| TransportError::Receive {
                peer: self.peer,
                source,
            })?;
            match frame {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(data) => return Ok(Some(data.to_vec())),
                Message::Close(_) => return Ok(None),
                // tungstenite queues the pong itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let peer = self.peer;
        self.outgoing
            .lock()
            .await
            .close()
            .await
            .map_err(|source| TransportError::Send { peer, source })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
