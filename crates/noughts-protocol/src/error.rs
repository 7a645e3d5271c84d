//! Error types for the protocol layer.
//!
//! Each crate in noughts defines its own error enum. A `ProtocolError`
//! always means a frame could not be turned into (or out of) a message;
//! it never describes a rejected move.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `gameID`/`playerID`,
    /// a non-numeric `position`, or an unknown request `type`. The server
    /// answers these with an [`ErrorKind::DecodeError`](crate::ErrorKind)
    /// reply instead of dropping the connection.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
