//! The session registry: every live game, keyed by session id.
//!
//! # Locking
//!
//! The registry holds one lock around its map and id counter. It is taken
//! only to mint-and-insert or to look up, and is always released before
//! the caller touches a session's own lock. No code path holds both, so
//! there is no lock ordering to get wrong.

use std::collections::HashMap;
use std::sync::Arc;

use noughts_protocol::{PlayerId, SessionId, Symbol};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{GameSession, IdStrategy, RegistryConfig, SessionError};

/// State guarded by the registry lock.
#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<SessionId, Arc<GameSession>>,
    /// Last sequential id handed out. Only ever grows.
    last_seq: u64,
}

/// Owns all active game sessions.
///
/// Constructed once at startup and shared (behind an `Arc`) with every
/// request handler. Sessions are never removed, so an id is never reused.
///
/// ```text
/// create_session() ──→ [registry lock: mint id, insert] ──→ (id, X)
/// get_session()    ──→ [registry lock: lookup] ──→ Arc<GameSession>
///                                                      │
///                                   [session lock: join / make_move / snapshot]
/// ```
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Creates an empty registry with the given config.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            config,
        }
    }

    /// Opens a new session with `creator` seated as `X`.
    ///
    /// Id minting and insertion happen under one critical section, so
    /// concurrent creates can neither collide nor lose an insert.
    pub async fn create_session(&self, creator: PlayerId) -> (SessionId, Symbol) {
        let mut sessions = self.sessions.lock().await;

        let id = self.mint_id(&mut sessions);
        let session = Arc::new(GameSession::new(id.clone(), creator.clone()));
        sessions.by_id.insert(id.clone(), session);

        tracing::info!(session_id = %id, player_id = %creator, "session created");
        (id, Symbol::X)
    }

    /// Looks up a session by exact id.
    ///
    /// The returned handle refers to the live session, not a copy. The
    /// registry lock is released before this returns.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session has this id.
    pub async fn get_session(&self, id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        self.sessions
            .lock()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Number of sessions created so far.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.by_id.len()
    }

    /// Returns `true` if no session has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.by_id.is_empty()
    }

    /// Produces an id not present in the map. Caller holds the lock.
    fn mint_id(&self, sessions: &mut Sessions) -> SessionId {
        let prefix = &self.config.id_prefix;
        match self.config.id_strategy {
            IdStrategy::Sequential => {
                sessions.last_seq += 1;
                SessionId(format!("{prefix}{}", sessions.last_seq))
            }
            IdStrategy::Random => loop {
                let id = SessionId(format!("{prefix}{}", random_suffix()));
                if !sessions.by_id.contains_key(&id) {
                    return id;
                }
            },
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// 64 random bits as 16 lowercase hex characters.
fn random_suffix() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    fn random_registry() -> SessionRegistry {
        SessionRegistry::new(RegistryConfig {
            id_strategy: IdStrategy::Random,
            ..RegistryConfig::default()
        })
    }

    // =====================================================================
    // create_session()
    // =====================================================================

    #[tokio::test]
    async fn test_create_session_returns_sequential_ids_and_x() {
        let registry = SessionRegistry::default();

        let (first, symbol) = registry.create_session(pid("alice")).await;
        let (second, _) = registry.create_session(pid("carol")).await;

        assert_eq!(first, SessionId::from("game-1"));
        assert_eq!(second, SessionId::from("game-2"));
        assert_eq!(symbol, Symbol::X);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_session_seats_creator_with_turn() {
        let registry = SessionRegistry::default();

        let (id, _) = registry.create_session(pid("alice")).await;
        let snap = registry.get_session(&id).await.unwrap().snapshot().await;

        assert_eq!(snap.current_turn, pid("alice"));
        assert_eq!(snap.players, vec![(pid("alice"), Symbol::X)]);
    }

    #[tokio::test]
    async fn test_create_session_accepts_empty_player_id() {
        let registry = SessionRegistry::default();
        let (id, symbol) = registry.create_session(pid("")).await;
        assert_eq!(symbol, Symbol::X);
        assert!(registry.get_session(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_session_random_ids_have_prefix_and_hex_suffix() {
        let registry = random_registry();

        let (id, _) = registry.create_session(pid("alice")).await;

        let suffix = id.as_str().strip_prefix("game-").expect("prefix kept");
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_create_session_random_ids_are_unique() {
        let registry = random_registry();
        let mut seen = HashSet::new();

        for i in 0..200 {
            let (id, _) = registry.create_session(pid(&format!("p{i}"))).await;
            assert!(seen.insert(id), "ids must never repeat");
        }
        assert_eq!(registry.len().await, 200);
    }

    #[tokio::test]
    async fn test_create_session_custom_prefix() {
        let registry = SessionRegistry::new(RegistryConfig {
            id_prefix: "match/".into(),
            ..RegistryConfig::default()
        });
        let (id, _) = registry.create_session(pid("alice")).await;
        assert_eq!(id.as_str(), "match/1");
    }

    // =====================================================================
    // get_session()
    // =====================================================================

    #[tokio::test]
    async fn test_get_session_unknown_id_returns_not_found() {
        let registry = SessionRegistry::default();
        registry.create_session(pid("alice")).await;

        let result = registry.get_session(&SessionId::from("game-99")).await;

        assert!(matches!(result, Err(SessionError::NotFound(id)) if id.as_str() == "game-99"));
    }

    #[tokio::test]
    async fn test_get_session_returns_live_shared_session() {
        let registry = SessionRegistry::default();
        let (id, _) = registry.create_session(pid("alice")).await;

        let a = registry.get_session(&id).await.unwrap();
        a.join(pid("bob")).await.unwrap();
        let b = registry.get_session(&id).await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.snapshot().await.players.len(), 2);
        assert_eq!(b.id(), &id);
    }

    #[tokio::test]
    async fn test_is_empty() {
        let registry = SessionRegistry::default();
        assert!(registry.is_empty().await);
        registry.create_session(pid("alice")).await;
        assert!(!registry.is_empty().await);
    }
}
