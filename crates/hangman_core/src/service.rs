//! crates/hangman_core/src/service.rs
//!
//! The operations the request-handling layer calls into. Each one composes
//! the ports: player lookup, word selection, the guess transition and
//! persistence.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::WordCatalog;
use crate::domain::{GameSession, LeaderboardRow, Level, Login, Player, PlayerId, SessionId};
use crate::ports::{
    CredentialPolicy, LeaderboardQuery, PlayerDirectory, PortError, PortResult, SessionStore,
};

/// The externally visible state of a session after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub session_id: SessionId,
    pub level: Level,
    pub masked: String,
    pub failures: u32,
    pub finished: bool,
    /// Set only for guesses.
    pub was_correct: Option<bool>,
}

impl Progress {
    fn of(session_id: SessionId, session: &GameSession, was_correct: Option<bool>) -> Self {
        Self {
            session_id,
            level: session.level,
            masked: session.masked().to_string(),
            failures: session.failures(),
            finished: session.is_finished(),
            was_correct,
        }
    }
}

/// One page of the leaderboard plus what a caller needs to paginate.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardPage {
    pub level: Level,
    pub page: u64,
    pub page_size: u64,
    pub total_players: u64,
    pub max_page: u64,
    pub rows: Vec<LeaderboardRow>,
}

/// Index of the last page. With no players at all this is page 0.
pub fn max_page(total_players: u64, page_size: u64) -> u64 {
    if total_players == 0 || page_size == 0 {
        return 0;
    }
    (total_players - 1) / page_size
}

#[derive(Clone)]
pub struct HangmanService {
    sessions: Arc<dyn SessionStore>,
    players: Arc<dyn PlayerDirectory>,
    leaderboard: Arc<dyn LeaderboardQuery>,
    catalog: Arc<WordCatalog>,
    credentials: Arc<dyn CredentialPolicy>,
}

impl HangmanService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        players: Arc<dyn PlayerDirectory>,
        leaderboard: Arc<dyn LeaderboardQuery>,
        catalog: Arc<WordCatalog>,
        credentials: Arc<dyn CredentialPolicy>,
    ) -> Self {
        Self {
            sessions,
            players,
            leaderboard,
            catalog,
            credentials,
        }
    }

    /// Authenticates `username`, registering it first if it has never been seen.
    pub async fn login_or_register(&self, username: &str, credential: &str) -> PortResult<Login> {
        if username.is_empty() {
            return Err(PortError::InvalidInput("username must not be empty".to_string()));
        }

        if let Some(player) = self.players.find_by_username(username).await? {
            return self.verify(player, credential);
        }

        let sealed = self.credentials.seal(credential)?;
        match self.players.create(username, &sealed).await {
            Ok(id) => {
                info!(%username, player_id = %id, "Registered new player");
                Ok(Login::NewlyRegisteredPlayer(Player {
                    id,
                    username: username.to_string(),
                    credential: sealed,
                }))
            }
            Err(PortError::Conflict(_)) => {
                // Someone registered the same name between lookup and insert.
                warn!(%username, "Concurrent registration, retrying lookup");
                let player = self
                    .players
                    .find_by_username(username)
                    .await?
                    .ok_or_else(|| {
                        PortError::NotFound(format!("username {} does not exist", username))
                    })?;
                self.verify(player, credential)
            }
            Err(e) => Err(e),
        }
    }

    fn verify(&self, player: Player, credential: &str) -> PortResult<Login> {
        if self.credentials.matches(&player.credential, credential) {
            Ok(Login::ExistingPlayer(player))
        } else {
            Err(PortError::CredentialMismatch(player.username))
        }
    }

    /// Draws a word for `level` and persists a fresh session for `player`.
    pub async fn start_session(&self, player: PlayerId, level: Level) -> PortResult<Progress> {
        let word = self.catalog.next_word(level).await?;
        let session = GameSession::new(player, level, word);
        let session_id = SessionId::generate();
        self.sessions.create(player, session_id, &session).await?;
        info!(%session_id, %player, %level, "Started game");
        Ok(Progress::of(session_id, &session, None))
    }

    pub async fn get_progress(&self, session_id: SessionId, player: PlayerId) -> PortResult<Progress> {
        let session = self.sessions.get(session_id, player).await?;
        Ok(Progress::of(session_id, &session, None))
    }

    /// Loads the session, applies the guess and writes the result back.
    ///
    /// Guesses on a finished session change nothing and are not written.
    /// A concurrent update of the same session surfaces as `Conflict`.
    pub async fn apply_guess(
        &self,
        session_id: SessionId,
        player: PlayerId,
        letter: char,
    ) -> PortResult<Progress> {
        let mut session = self.sessions.get(session_id, player).await?;
        let outcome = session.apply_guess(letter);
        debug!(
            %session_id,
            %letter,
            correct = outcome.was_correct,
            applied = outcome.applied,
            "Applied guess"
        );
        if outcome.applied {
            self.sessions.update(session_id, &session).await?;
            session.version += 1;
            if session.is_finished() {
                info!(%session_id, failures = session.failures(), "Game finished");
            }
        }
        Ok(Progress::of(session_id, &session, Some(outcome.was_correct)))
    }

    pub async fn rank(&self, level: Level, page: u64, page_size: u64) -> PortResult<LeaderboardPage> {
        if page_size == 0 {
            return Err(PortError::InvalidInput("page_size must be positive".to_string()));
        }
        let total_players = self.leaderboard.count_players(level).await?;
        let rows = self.leaderboard.rank(level, page, page_size).await?;
        Ok(LeaderboardPage {
            level,
            page,
            page_size,
            total_players,
            max_page: max_page(total_players, page_size),
            rows,
        })
    }
}
