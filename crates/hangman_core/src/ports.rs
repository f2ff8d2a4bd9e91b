//! crates/hangman_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the game's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage backends and word sources.

use async_trait::async_trait;

use crate::domain::{GameSession, LeaderboardRow, Level, Player, PlayerId, SessionId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
///
/// The boundary layer picks a response shape from the variant, so each kind
/// of failure gets its own variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("password for {0} is not correct")]
    CredentialMismatch(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("word catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports
//=========================================================================================

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session. An existing `session_id` is a `Conflict`.
    async fn create(
        &self,
        player: PlayerId,
        session_id: SessionId,
        session: &GameSession,
    ) -> PortResult<()>;

    /// Fetches a session owned by `player`. Sessions owned by anyone else
    /// are reported exactly like missing ones.
    async fn get(&self, session_id: SessionId, player: PlayerId) -> PortResult<GameSession>;

    /// Writes the mutable columns of `session` if the stored version still
    /// equals `session.version`; otherwise fails with `Conflict`.
    async fn update(&self, session_id: SessionId, session: &GameSession) -> PortResult<()>;
}

#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> PortResult<Option<Player>>;

    /// Registers a player. A taken username is a `Conflict`.
    async fn create(&self, username: &str, credential: &str) -> PortResult<PlayerId>;
}

#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// Players ranked by ascending average failures over completed sessions,
    /// ties by ascending player id. `page` is zero-indexed.
    async fn rank(&self, level: Level, page: u64, page_size: u64)
        -> PortResult<Vec<LeaderboardRow>>;

    /// Distinct players with at least one completed session at `level`.
    async fn count_players(&self, level: Level) -> PortResult<u64>;
}

//=========================================================================================
// Word and Credential Ports
//=========================================================================================

#[async_trait]
pub trait WordSource: Send + Sync {
    /// Reads the full candidate pool for a level.
    async fn load(&self, level: Level) -> PortResult<Vec<String>>;
}

/// How credentials are stored and compared.
pub trait CredentialPolicy: Send + Sync {
    /// Turns a supplied secret into the value kept in the player directory.
    fn seal(&self, secret: &str) -> PortResult<String>;

    /// Whether `supplied` matches the stored value.
    fn matches(&self, stored: &str, supplied: &str) -> bool;
}

/// Stores the secret as given and compares for exact equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCredentials;

impl CredentialPolicy for PlainCredentials {
    fn seal(&self, secret: &str) -> PortResult<String> {
        Ok(secret.to_string())
    }

    fn matches(&self, stored: &str, supplied: &str) -> bool {
        stored == supplied
    }
}
