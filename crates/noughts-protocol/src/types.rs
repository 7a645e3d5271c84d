//! Core protocol types for the noughts wire format.
//!
//! Every type here is something that gets serialized, sent over the
//! network, and deserialized on the other side. JSON field names follow
//! the public request/response contract (`gameID`, `playerID`,
//! `currentTurn`), which is why several fields carry `#[serde(rename)]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Number of cells on the board (3×3, row-major).
pub const BOARD_CELLS: usize = 9;

/// The board as it travels on the wire: nine cells, `None` for empty.
pub type Cells = [Option<Symbol>; BOARD_CELLS];

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A caller-supplied player identifier.
///
/// Opaque to the server: any string is accepted, including the empty
/// string. `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A server-issued session identifier, e.g. `game-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// The mark a player places. The first entrant plays `X`, the second `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// Returns `"X"` or `"O"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Self::X),
            "O" => Ok(Self::O),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown symbol {other:?}"
            ))),
        }
    }
}

/// Serde adapter for `Option<Symbol>` where the empty string means `None`.
///
/// The public contract reports "no winner" and "empty cell" as `""`
/// rather than `null`.
mod blank {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Symbol;

    pub(super) fn parse(raw: &str) -> Result<Option<Symbol>, crate::ProtocolError> {
        if raw.is_empty() {
            Ok(None)
        } else {
            raw.parse().map(Some)
        }
    }

    pub fn serialize<S: Serializer>(value: &Option<Symbol>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map_or("", Symbol::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Symbol>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }
}

/// Serde adapter for the board: a JSON array of exactly nine strings.
mod cells {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{BOARD_CELLS, Cells, Symbol, blank};

    pub fn serialize<S: Serializer>(cells: &Cells, s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(BOARD_CELLS))?;
        for cell in cells {
            seq.serialize_element(cell.map_or("", Symbol::as_str))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Cells, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        if raw.len() != BOARD_CELLS {
            return Err(de::Error::invalid_length(raw.len(), &"9 board cells"));
        }
        let mut cells = [None; BOARD_CELLS];
        for (cell, text) in cells.iter_mut().zip(&raw) {
            *cell = blank::parse(text).map_err(de::Error::custom)?;
        }
        Ok(cells)
    }
}

// ---------------------------------------------------------------------------
// GameStatus / ErrorKind
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle, as reported to clients.
///
/// `winner` alone cannot tell a draw from a game still being played
/// (both report `""`), so replies carry this alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    WaitingForPlayer,
    InProgress,
    Won,
    Draw,
}

/// Machine-readable reason attached to an error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No session with the given id.
    NotFound,
    /// A join was attempted on a session that already has two players.
    SessionFull,
    /// The joining player already holds a seat in this session.
    AlreadyJoined,
    /// The mover is not the player whose turn it is.
    NotYourTurn,
    /// Position outside 0–8 or the cell is already taken.
    InvalidMove,
    /// A move was attempted before the second player joined.
    WaitingForPlayer,
    /// A move was attempted after the game finished.
    GameOver,
    /// The frame could not be decoded into a message.
    DecodeError,
}

impl ErrorKind {
    /// HTTP-style status code for this kind: 404 for an unknown session,
    /// 400 for everything else.
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            _ => 400,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// Client → Server operations.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "MakeMove", "gameID": "game-1", "playerID": "alice", "position": 4 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Open a new session; the caller becomes `X`.
    CreateSession {
        #[serde(rename = "playerID")]
        player_id: PlayerId,
    },

    /// Take the second seat (`O`) in an existing session.
    JoinSession {
        #[serde(rename = "gameID")]
        game_id: SessionId,
        #[serde(rename = "playerID")]
        player_id: PlayerId,
    },

    /// Place the caller's symbol at `position` (0–8, row-major).
    ///
    /// Signed so that a negative position is rejected as an invalid move
    /// rather than as an undecodable frame.
    MakeMove {
        #[serde(rename = "gameID")]
        game_id: SessionId,
        #[serde(rename = "playerID")]
        player_id: PlayerId,
        position: i64,
    },

    /// Read the board, whose turn it is, and the winner.
    GetState {
        #[serde(rename = "gameID")]
        game_id: SessionId,
    },
}

impl Request {
    /// Returns the operation name, for logging.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "CreateSession",
            Self::JoinSession { .. } => "JoinSession",
            Self::MakeMove { .. } => "MakeMove",
            Self::GetState { .. } => "GetState",
        }
    }
}

/// Server → Client replies, one per successful [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Reply to `CreateSession`.
    SessionCreated {
        #[serde(rename = "gameID")]
        game_id: SessionId,
        symbol: Symbol,
    },

    /// Reply to `JoinSession`.
    SessionJoined { symbol: Symbol },

    /// Reply to `MakeMove`: the board after the move.
    MoveMade {
        #[serde(with = "cells")]
        board: Cells,
        #[serde(with = "blank")]
        winner: Option<Symbol>,
        status: GameStatus,
    },

    /// Reply to `GetState`.
    State {
        #[serde(with = "cells")]
        board: Cells,
        #[serde(rename = "currentTurn")]
        current_turn: PlayerId,
        #[serde(with = "blank")]
        winner: Option<Symbol>,
        status: GameStatus,
    },
}

// ---------------------------------------------------------------------------
// SystemMessage: connection plumbing
// ---------------------------------------------------------------------------

/// Messages that are about the connection rather than the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemMessage {
    /// Client → Server: "I'm still here." Resets the idle timeout.
    Heartbeat { client_time: u64 },

    /// Server → Client: echo of `client_time` plus the server clock
    /// (milliseconds since the connection was accepted).
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Client → Server: "I'm leaving." The server closes the socket.
    Disconnect { reason: String },

    /// Server → Client: the request with the same `seq` failed, or a
    /// frame could not be decoded (then `seq` is 0).
    Error {
        kind: ErrorKind,
        code: u16,
        message: String,
    },
}

impl SystemMessage {
    /// Builds an `Error` message with the status code derived from `kind`.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            code: kind.status_code(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// The content of a frame.
///
/// `#[serde(tag = "type", content = "data")]` produces adjacently tagged
/// JSON, e.g.
/// `{ "type": "Request", "data": { "type": "GetState", "gameID": "game-1" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Request(Request),
    Response(Response),
    System(SystemMessage),
}

/// The top-level wrapper around every frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Chosen by the client for requests; a reply carries the `seq` of
    /// the request it answers so clients can match them up.
    pub seq: u64,

    /// Milliseconds since the connection was accepted (server frames).
    /// Clients may omit it.
    #[serde(default)]
    pub timestamp: u64,

    /// The actual message content.
    pub payload: Payload,
}

// =========================================================================
// Tests
// =========================================================================
