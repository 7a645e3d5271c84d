//! # Noughts
//!
//! Multiplayer tic-tac-toe session server.
//!
//! Clients open a WebSocket, send [`Request`](noughts_protocol::Request)
//! envelopes (create, join, move, get state) and receive one reply per
//! request. Any number of sessions run side by side; each one serializes
//! its own moves, so two players racing for the same cell can never both
//! win it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noughts::prelude::*;
//!
//! # async fn run() -> Result<(), NoughtsError> {
//! let server = NoughtsServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatch;
mod error;
mod handler;
mod server;

pub use dispatch::dispatch;
pub use error::NoughtsError;
pub use server::{DEFAULT_BIND_ADDR, DEFAULT_IDLE_TIMEOUT, NoughtsServer, NoughtsServerBuilder};

/// Everything needed to run a server or talk to one in-process.
pub mod prelude {
    pub use crate::{
        DEFAULT_BIND_ADDR, DEFAULT_IDLE_TIMEOUT, NoughtsError, NoughtsServer,
        NoughtsServerBuilder, dispatch,
    };
    pub use noughts_protocol::{
        Envelope, ErrorKind, GameStatus, Payload, PlayerId, Request, Response, SessionId, Symbol,
        SystemMessage,
    };
    pub use noughts_session::{IdStrategy, RegistryConfig, SessionError, SessionRegistry};
}
