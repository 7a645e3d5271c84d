//! The operation table: one [`Request`] in, one [`Response`] out.
//!
//! Transport-agnostic: the connection handler calls this, and so can
//! anything else that holds a registry.

use noughts_protocol::{GameStatus, Request, Response};
use noughts_session::{SessionError, SessionRegistry};

/// Executes `request` against `registry`.
///
/// Every operation resolves its session through the registry first and
/// only then calls into the session, so the registry lock is never held
/// while a session lock is taken.
///
/// # Errors
/// Whatever the registry or session rejects the request with.
pub async fn dispatch(
    registry: &SessionRegistry,
    request: Request,
) -> Result<Response, SessionError> {
    match request {
        Request::CreateSession { player_id } => {
            let (game_id, symbol) = registry.create_session(player_id).await;
            Ok(Response::SessionCreated { game_id, symbol })
        }

        Request::JoinSession { game_id, player_id } => {
            let session = registry.get_session(&game_id).await?;
            let symbol = session.join(player_id).await?;
            Ok(Response::SessionJoined { symbol })
        }

        Request::MakeMove {
            game_id,
            player_id,
            position,
        } => {
            let session = registry.get_session(&game_id).await?;
            let outcome = session.make_move(&player_id, position).await?;
            Ok(Response::MoveMade {
                board: outcome.board.cells(),
                winner: outcome.winner,
                status: GameStatus::from(outcome.state),
            })
        }

        Request::GetState { game_id } => {
            let snapshot = registry.get_session(&game_id).await?.snapshot().await;
            Ok(Response::State {
                board: snapshot.board.cells(),
                current_turn: snapshot.current_turn,
                winner: snapshot.winner,
                status: GameStatus::from(snapshot.state),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use noughts_protocol::{ErrorKind, PlayerId, SessionId, Symbol};

    use super::*;

    fn create(player: &str) -> Request {
        Request::CreateSession {
            player_id: PlayerId::from(player),
        }
    }

    fn join(game: &str, player: &str) -> Request {
        Request::JoinSession {
            game_id: SessionId::from(game),
            player_id: PlayerId::from(player),
        }
    }

    fn mv(game: &str, player: &str, position: i64) -> Request {
        Request::MakeMove {
            game_id: SessionId::from(game),
            player_id: PlayerId::from(player),
            position,
        }
    }

    fn state(game: &str) -> Request {
        Request::GetState {
            game_id: SessionId::from(game),
        }
    }

    #[tokio::test]
    async fn test_dispatch_full_scenario() {
        let registry = SessionRegistry::default();

        let created = dispatch(&registry, create("alice")).await.unwrap();
        assert_eq!(
            created,
            Response::SessionCreated {
                game_id: SessionId::from("game-1"),
                symbol: Symbol::X,
            }
        );

        let joined = dispatch(&registry, join("game-1", "bob")).await.unwrap();
        assert_eq!(joined, Response::SessionJoined { symbol: Symbol::O });

        let first = dispatch(&registry, mv("game-1", "alice", 0)).await.unwrap();
        let mut board = [None; 9];
        board[0] = Some(Symbol::X);
        assert_eq!(
            first,
            Response::MoveMade {
                board,
                winner: None,
                status: GameStatus::InProgress,
            }
        );

        dispatch(&registry, mv("game-1", "bob", 4)).await.unwrap();
        let Response::State { current_turn, .. } =
            dispatch(&registry, state("game-1")).await.unwrap()
        else {
            panic!("expected State");
        };
        assert_eq!(current_turn, PlayerId::from("alice"));

        dispatch(&registry, mv("game-1", "alice", 1)).await.unwrap();
        dispatch(&registry, mv("game-1", "bob", 7)).await.unwrap();
        let last = dispatch(&registry, mv("game-1", "alice", 2)).await.unwrap();
        assert!(matches!(
            last,
            Response::MoveMade {
                winner: Some(Symbol::X),
                status: GameStatus::Won,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_game_returns_not_found() {
        let registry = SessionRegistry::default();

        for request in [join("nope", "bob"), mv("nope", "bob", 0), state("nope")] {
            let err = dispatch(&registry, request).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[tokio::test]
    async fn test_dispatch_join_full_session_returns_session_full() {
        let registry = SessionRegistry::default();
        dispatch(&registry, create("alice")).await.unwrap();
        dispatch(&registry, join("game-1", "bob")).await.unwrap();

        let err = dispatch(&registry, join("game-1", "carol")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SessionFull);
    }

    #[tokio::test]
    async fn test_dispatch_rejections_map_to_error_kinds() {
        let registry = SessionRegistry::default();
        dispatch(&registry, create("alice")).await.unwrap();

        let err = dispatch(&registry, mv("game-1", "alice", 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WaitingForPlayer);

        dispatch(&registry, join("game-1", "bob")).await.unwrap();

        let err = dispatch(&registry, mv("game-1", "bob", 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotYourTurn);

        let err = dispatch(&registry, mv("game-1", "alice", 9)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMove);
    }

    #[tokio::test]
    async fn test_dispatch_state_before_join_reports_waiting() {
        let registry = SessionRegistry::default();
        dispatch(&registry, create("alice")).await.unwrap();

        let resp = dispatch(&registry, state("game-1")).await.unwrap();

        assert_eq!(
            resp,
            Response::State {
                board: [None; 9],
                current_turn: PlayerId::from("alice"),
                winner: None,
                status: GameStatus::WaitingForPlayer,
            }
        );
    }
}
