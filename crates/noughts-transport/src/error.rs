#[cfg(feature = "websocket")]
use std::net::SocketAddr;

#[cfg(feature = "websocket")]
use tokio_tungstenite::tungstenite;

/// Errors raised while listening for or talking to a peer.
///
/// Socket-level failures carry the `io::Error`; frame-level failures on a
/// WebSocket carry the `tungstenite` error untouched so the cause (protocol
/// violation, reset, oversized frame) stays visible in logs.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind to {addr} failed: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The TCP accept itself failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The listener's local address could not be read.
    #[error("local address unavailable: {0}")]
    LocalAddr(#[source] std::io::Error),

    /// The peer connected but the WebSocket upgrade did not complete.
    #[cfg(feature = "websocket")]
    #[error("websocket upgrade from {peer} failed: {source}")]
    Handshake {
        peer: SocketAddr,
        #[source]
        source: tungstenite::Error,
    },

    /// Writing a frame (or the close frame) failed.
    #[cfg(feature = "websocket")]
    #[error("send to {peer} failed: {source}")]
    Send {
        peer: SocketAddr,
        #[source]
        source: tungstenite::Error,
    },

    /// Reading the next frame failed.
    #[cfg(feature = "websocket")]
    #[error("receive from {peer} failed: {source}")]
    Receive {
        peer: SocketAddr,
        #[source]
        source: tungstenite::Error,
    },
}
