//! A single game session: seats, turn arbitration, and the game state machine.
//!
//! A [`GameSession`] is shared between every request that names its id,
//! so all of its state sits behind one `tokio::sync::Mutex`. Each
//! operation takes the lock once, checks its preconditions, and only then
//! mutates; a rejected operation leaves the session exactly as it was.

use std::fmt;

use noughts_protocol::{GameStatus, PlayerId, SessionId, Symbol};
use tokio::sync::Mutex;

use crate::{Board, SessionError};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A line was completed by this symbol.
    Won(Symbol),
    /// The board filled up with no completed line.
    Draw,
}

/// The lifecycle state of a session.
///
/// ```text
/// WaitingForPlayer ──(join)──→ InProgress ──(winning or final move)──→ Finished
///                                  ↺ (move)
/// ```
///
/// - **WaitingForPlayer**: only the creator is seated. Joins are
///   accepted; moves are not.
/// - **InProgress**: both seats taken. Moves alternate between players.
/// - **Finished**: someone completed a line or the board is full. The
///   session is read-only from here on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    WaitingForPlayer,
    InProgress,
    Finished(Outcome),
}

impl SessionState {
    /// Returns `true` if a second player may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayer)
    }

    /// Returns `true` if moves are currently accepted.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns `true` once the game has ended.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// The winning symbol, if the game ended with a completed line.
    pub fn winner(&self) -> Option<Symbol> {
        match self {
            Self::Finished(Outcome::Won(symbol)) => Some(*symbol),
            _ => None,
        }
    }

    /// Returns `true` if moving from `self` to `target` is a legal step.
    ///
    /// `InProgress → InProgress` is legal (a move that doesn't end the game).
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::WaitingForPlayer, Self::InProgress)
                | (Self::InProgress, Self::InProgress)
                | (Self::InProgress, Self::Finished(_))
        )
    }
}

impl From<SessionState> for GameStatus {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::WaitingForPlayer => Self::WaitingForPlayer,
            SessionState::InProgress => Self::InProgress,
            SessionState::Finished(Outcome::Won(_)) => Self::Won,
            SessionState::Finished(Outcome::Draw) => Self::Draw,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForPlayer => write!(f, "WaitingForPlayer"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished(Outcome::Won(symbol)) => write!(f, "Finished({symbol} won)"),
            Self::Finished(Outcome::Draw) => write!(f, "Finished(draw)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Results handed back to callers
// ---------------------------------------------------------------------------

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The board after the move.
    pub board: Board,
    /// The winning symbol, if this or an earlier move completed a line.
    pub winner: Option<Symbol>,
    /// The state after the move.
    pub state: SessionState,
}

/// A consistent, point-in-time copy of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    /// The player whose move is valid next. Before the second player
    /// joins this is the creator.
    pub current_turn: PlayerId,
    pub winner: Option<Symbol>,
    pub state: SessionState,
    /// Seated players in join order, with their symbols.
    pub players: Vec<(PlayerId, Symbol)>,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// Mutable game state, only ever touched with the session lock held.
#[derive(Debug)]
struct Game {
    board: Board,
    /// First entrant; always plays `X`.
    x: PlayerId,
    /// Second entrant; always plays `O`.
    o: Option<PlayerId>,
    current_turn: PlayerId,
    state: SessionState,
}

impl Game {
    fn symbol_of(&self, player: &PlayerId) -> Option<Symbol> {
        if *player == self.x {
            Some(Symbol::X)
        } else if self.o.as_ref() == Some(player) {
            Some(Symbol::O)
        } else {
            None
        }
    }

    /// The seated player that isn't `player`, if there is one.
    fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        if *player == self.x {
            self.o.as_ref()
        } else {
            Some(&self.x)
        }
    }

    /// Moves the state machine forward. Only legal steps are taken.
    fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.state = next;
    }

    fn players(&self) -> Vec<(PlayerId, Symbol)> {
        let mut players = vec![(self.x.clone(), Symbol::X)];
        if let Some(o) = &self.o {
            players.push((o.clone(), Symbol::O));
        }
        players
    }
}

/// One tic-tac-toe game between up to two players.
///
/// Owned by the [`SessionRegistry`](crate::SessionRegistry) and handed to
/// callers as an `Arc<GameSession>` for the duration of one operation.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    game: Mutex<Game>,
}

impl GameSession {
    /// Creates a session with `creator` seated as `X` and holding the turn.
    pub fn new(id: SessionId, creator: PlayerId) -> Self {
        Self {
            id,
            game: Mutex::new(Game {
                board: Board::new(),
                x: creator.clone(),
                o: None,
                current_turn: creator,
                state: SessionState::WaitingForPlayer,
            }),
        }
    }

    /// The id this session is registered under.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Seats `player` as `O` and starts the game.
    ///
    /// The creator cannot take the second seat as well: that would leave
    /// one player holding both symbols in a game nobody else can join.
    ///
    /// # Errors
    /// - [`SessionError::SessionFull`] if both seats are taken
    /// - [`SessionError::AlreadyJoined`] if `player` already holds the `X` seat
    pub async fn join(&self, player: PlayerId) -> Result<Symbol, SessionError> {
        let mut game = self.game.lock().await;

        if !game.state.is_joinable() {
            return Err(SessionError::SessionFull(self.id.clone()));
        }
        if game.x == player {
            return Err(SessionError::AlreadyJoined(player, self.id.clone()));
        }

        tracing::info!(session_id = %self.id, player_id = %player, "player joined as O");
        game.o = Some(player);
        game.advance(SessionState::InProgress);
        Ok(Symbol::O)
    }

    /// Places `player`'s symbol at `position` and passes the turn.
    ///
    /// Preconditions are checked in this order, all before any mutation:
    /// the game must not be finished, a second player must have joined,
    /// `player` must hold the turn, and `position` must be an open cell.
    ///
    /// # Errors
    /// [`SessionError::GameOver`], [`SessionError::WaitingForPlayer`],
    /// [`SessionError::NotYourTurn`] or [`SessionError::InvalidMove`].
    pub async fn make_move(
        &self,
        player: &PlayerId,
        position: i64,
    ) -> Result<MoveOutcome, SessionError> {
        let mut game = self.game.lock().await;

        if game.state.is_finished() {
            return Err(SessionError::GameOver(self.id.clone()));
        }
        if !game.state.accepts_moves() {
            return Err(SessionError::WaitingForPlayer(self.id.clone()));
        }

        let not_your_turn = || SessionError::NotYourTurn {
            player: player.clone(),
            expected: game.current_turn.clone(),
        };
        if *player != game.current_turn {
            return Err(not_your_turn());
        }
        let symbol = game.symbol_of(player).ok_or_else(not_your_turn)?;

        game.board.place(position, symbol)?;

        if let Some(next) = game.opponent_of(player).cloned() {
            game.current_turn = next;
        }

        let next = match game.board.winner() {
            Some(winner) => SessionState::Finished(Outcome::Won(winner)),
            None if game.board.is_full() => SessionState::Finished(Outcome::Draw),
            None => SessionState::InProgress,
        };
        game.advance(next);

        if game.state.is_finished() {
            tracing::info!(
                session_id = %self.id,
                board = %game.board,
                state = %game.state,
                "game finished"
            );
        }

        Ok(MoveOutcome {
            board: game.board,
            winner: game.state.winner(),
            state: game.state,
        })
    }

    /// Returns a consistent copy of the session's state.
    pub async fn snapshot(&self) -> Snapshot {
        let game = self.game.lock().await;
        Snapshot {
            board: game.board,
            current_turn: game.current_turn.clone(),
            winner: game.state.winner(),
            state: game.state,
            players: game.players(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
