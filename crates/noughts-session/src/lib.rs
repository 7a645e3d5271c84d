//! Game sessions and the session registry for noughts.
//!
//! This crate is the whole game core:
//!
//! 1. **Board**: nine cells and win detection ([`Board`])
//! 2. **Game session**: seats, turn arbitration, and the
//!    `WaitingForPlayer → InProgress → Finished` state machine
//!    ([`GameSession`])
//! 3. **Registry**: creates sessions, mints unique ids, and hands out
//!    shared handles ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← resolves a session through the registry, then calls it
//!     ↕
//! Session core (this crate)  ← all game state and its locking
//!     ↕
//! Protocol (below)  ← PlayerId, SessionId, Symbol, GameStatus
//! ```

mod board;
mod config;
mod error;
mod registry;
mod session;

pub use board::{Board, LINES};
pub use config::{IdStrategy, RegistryConfig};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{GameSession, MoveOutcome, Outcome, SessionState, Snapshot};
