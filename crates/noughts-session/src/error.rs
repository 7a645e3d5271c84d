//! Error types for the session layer.

use noughts_protocol::{ErrorKind, PlayerId, SessionId};

/// Why a registry or session operation was rejected.
///
/// Every variant is raised before any state is touched, so a failed
/// operation never leaves a session half-updated.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session is registered under this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session already seats two players.
    #[error("session {0} is full")]
    SessionFull(SessionId),

    /// The joining player already holds a seat in the session.
    #[error("player {0} already joined session {1}")]
    AlreadyJoined(PlayerId, SessionId),

    /// The mover is not the player whose turn it is.
    #[error("not your turn: waiting for {expected}, got {player}")]
    NotYourTurn { player: PlayerId, expected: PlayerId },

    /// The position is outside 0–8 or the cell is already occupied.
    #[error("invalid move at position {0}")]
    InvalidMove(i64),

    /// A move arrived before a second player joined.
    #[error("session {0} is waiting for a second player")]
    WaitingForPlayer(SessionId),

    /// A move arrived after the game finished.
    #[error("game in session {0} is over")]
    GameOver(SessionId),
}

impl SessionError {
    /// Maps the error onto the wire-level [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::SessionFull(_) => ErrorKind::SessionFull,
            Self::AlreadyJoined(..) => ErrorKind::AlreadyJoined,
            Self::NotYourTurn { .. } => ErrorKind::NotYourTurn,
            Self::InvalidMove(_) => ErrorKind::InvalidMove,
            Self::WaitingForPlayer(_) => ErrorKind::WaitingForPlayer,
            Self::GameOver(_) => ErrorKind::GameOver,
        }
    }
}
