//! crates/hangman_core/src/memory.rs
//!
//! An in-process implementation of the storage ports. Used by tests and by
//! the `memory` storage backend for local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::{GameSession, LeaderboardRow, Level, Player, PlayerId, SessionId};
use crate::ports::{LeaderboardQuery, PlayerDirectory, PortError, PortResult, SessionStore};

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    players: Vec<Player>,
    /// Insertion order is kept so "storage order" has a meaning here too.
    sessions: Vec<(SessionId, GameSession)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create(
        &self,
        player: PlayerId,
        session_id: SessionId,
        session: &GameSession,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.sessions.iter().any(|(id, _)| *id == session_id) {
            return Err(PortError::Conflict(format!(
                "game_id {} already exists",
                session_id
            )));
        }
        let mut stored = session.clone();
        stored.player_id = player;
        inner.sessions.push((session_id, stored));
        Ok(())
    }

    async fn get(&self, session_id: SessionId, player: PlayerId) -> PortResult<GameSession> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .iter()
            .find(|(id, s)| *id == session_id && s.player_id == player)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| {
                PortError::NotFound(format!("game_id {} does not exist for given user", session_id))
            })
    }

    async fn update(&self, session_id: SessionId, session: &GameSession) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .sessions
            .iter_mut()
            .find(|(id, _)| *id == session_id)
            .map(|(_, s)| s)
            .ok_or_else(|| PortError::NotFound(format!("game_id {} does not exist", session_id)))?;
        if stored.version != session.version {
            return Err(PortError::Conflict(format!(
                "game_id {} was modified concurrently",
                session_id
            )));
        }
        let player_id = stored.player_id;
        *stored = session.clone();
        stored.player_id = player_id;
        stored.version = session.version + 1;
        Ok(())
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> PortResult<Option<Player>> {
        let inner = self.inner.lock().await;
        Ok(inner.players.iter().find(|p| p.username == username).cloned())
    }

    async fn create(&self, username: &str, credential: &str) -> PortResult<PlayerId> {
        let mut inner = self.inner.lock().await;
        if inner.players.iter().any(|p| p.username == username) {
            return Err(PortError::Conflict(format!("username {} is taken", username)));
        }
        let id = PlayerId(inner.players.len() as i64 + 1);
        inner.players.push(Player {
            id,
            username: username.to_string(),
            credential: credential.to_string(),
        });
        Ok(id)
    }
}

#[async_trait]
impl LeaderboardQuery for InMemoryStore {
    async fn rank(
        &self,
        level: Level,
        page: u64,
        page_size: u64,
    ) -> PortResult<Vec<LeaderboardRow>> {
        let inner = self.inner.lock().await;
        let ranking = inner.ranking(level);
        let start = page.saturating_mul(page_size);
        Ok(ranking
            .into_iter()
            .enumerate()
            .skip(usize::try_from(start).unwrap_or(usize::MAX))
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .map(|(i, (player_id, total, games))| LeaderboardRow {
                rank: i as u64 + 1,
                player_id,
                username: inner.username(player_id),
                average_failures: total as f64 / games as f64,
                completed_games: games,
            })
            .collect())
    }

    async fn count_players(&self, level: Level) -> PortResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.ranking(level).len() as u64)
    }
}

impl Inner {
    /// `(player, total failures, completed games)` in ranking order.
    fn ranking(&self, level: Level) -> Vec<(PlayerId, u64, u64)> {
        let mut totals: HashMap<PlayerId, (u64, u64)> = HashMap::new();
        for (_, s) in &self.sessions {
            if s.level == level && s.is_finished() {
                let entry = totals.entry(s.player_id).or_default();
                entry.0 += u64::from(s.failures());
                entry.1 += 1;
            }
        }
        let mut rows: Vec<_> = totals
            .into_iter()
            .map(|(player, (total, games))| (player, total, games))
            .collect();
        // Compare averages exactly: a/b < c/d  <=>  a*d < c*b.
        rows.sort_by(|a, b| {
            (u128::from(a.1) * u128::from(b.2))
                .cmp(&(u128::from(b.1) * u128::from(a.2)))
                .then(a.0.cmp(&b.0))
        });
        rows
    }

    fn username(&self, id: PlayerId) -> String {
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.username.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(player: PlayerId, level: Level, word: &str, misses: &[char]) -> GameSession {
        let mut s = GameSession::new(player, level, word);
        for &c in misses {
            s.apply_guess(c);
        }
        for c in word.chars() {
            s.apply_guess(c);
        }
        s
    }

    #[tokio::test]
    async fn get_hides_sessions_of_other_players() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        let game = GameSession::new(PlayerId(1), Level::Basic, "cat");
        SessionStore::create(&store, PlayerId(1), id, &game).await.unwrap();

        assert!(store.get(id, PlayerId(1)).await.is_ok());
        let err = store.get(id, PlayerId(2)).await.unwrap_err();
        let missing = store.get(SessionId::generate(), PlayerId(2)).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert!(matches!(missing, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        let game = GameSession::new(PlayerId(1), Level::Basic, "cat");
        SessionStore::create(&store, PlayerId(1), id, &game)
            .await
            .unwrap();

        let mut a = store.get(id, PlayerId(1)).await.unwrap();
        let mut b = store.get(id, PlayerId(1)).await.unwrap();
        a.apply_guess('c');
        b.apply_guess('z');

        store.update(id, &a).await.unwrap();
        let err = store.update(id, &b).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        let stored = store.get(id, PlayerId(1)).await.unwrap();
        assert_eq!(stored.masked(), "c__");
        assert_eq!(stored.failures(), 0);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn duplicate_create_is_a_conflict() {
        let store = InMemoryStore::new();
        let id = SessionId::generate();
        let game = GameSession::new(PlayerId(1), Level::Basic, "cat");
        SessionStore::create(&store, PlayerId(1), id, &game).await.unwrap();
        assert!(matches!(
            SessionStore::create(&store, PlayerId(1), id, &game).await,
            Err(PortError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn ranking_ignores_unfinished_and_other_levels() {
        let store = InMemoryStore::new();
        let alice = PlayerDirectory::create(&store, "alice", "pw").await.unwrap();
        let bob = PlayerDirectory::create(&store, "bob", "pw").await.unwrap();

        let done = finished(alice, Level::Basic, "cat", &['x']);
        let open = GameSession::new(bob, Level::Basic, "dog");
        let other_level = finished(bob, Level::Advanced, "owl", &[]);
        for (player, game) in [(alice, done), (bob, open), (bob, other_level)] {
            SessionStore::create(&store, player, SessionId::generate(), &game)
                .await
                .unwrap();
        }

        let rows = store.rank(Level::Basic, 0, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
        assert_eq!(rows[0].average_failures, 1.0);
        assert_eq!(store.count_players(Level::Basic).await.unwrap(), 1);
        assert_eq!(store.count_players(Level::Advanced).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = InMemoryStore::new();
        PlayerDirectory::create(&store, "alice", "pw").await.unwrap();
        let err = PlayerDirectory::create(&store, "alice", "other").await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
        assert!(store.find_by_username("Alice").await.unwrap().is_none());
    }
}
