//! Wire protocol for noughts.
//!
//! This crate defines what travels between a client and the game server:
//!
//! - **Types** ([`Envelope`], [`Request`], [`Response`], [`SystemMessage`])
//!  : the message structures that travel on the wire, plus the identity
//!   types ([`PlayerId`], [`SessionId`], [`Symbol`]) shared with the game
//!   core.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the session
//! core. It knows nothing about boards or turns; it only knows how the
//! four operations and their replies look once serialized.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session core (GameSession)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BOARD_CELLS, Cells, Envelope, ErrorKind, GameStatus, Payload, PlayerId, Request, Response,
    SessionId, Symbol, SystemMessage,
};
