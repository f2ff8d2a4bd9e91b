//! crates/hangman_core/src/domain.rs
//!
//! Defines the pure, core data structures for the game.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The character shown in masked progress for a position not yet revealed.
pub const UNKNOWN: char = '_';

//=========================================================================================
// Identifiers
//=========================================================================================

/// Store-assigned identifier of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied, globally unique identifier of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// A fresh random 128-bit session token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

//=========================================================================================
// Level
//=========================================================================================

/// Difficulty category; decides which word pool a session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Basic,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::Basic, Level::Advanced];

    /// The single-character code persisted in the `games.level` column.
    pub fn code(self) -> &'static str {
        match self {
            Level::Basic => "B",
            Level::Advanced => "A",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B" => Some(Level::Basic),
            "A" => Some(Level::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Basic => f.write_str("basic"),
            Level::Advanced => f.write_str("advanced"),
        }
    }
}

/// Accepts either the persisted code (`B`, `A`) or the name (`basic`, `advanced`).
impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(level) = Level::from_code(s) {
            return Ok(level);
        }
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Level::Basic),
            "advanced" => Ok(Level::Advanced),
            _ => Err(format!("unknown level '{}'", s)),
        }
    }
}

//=========================================================================================
// Player
//=========================================================================================

/// A registered player. The credential is whatever the active
/// credential policy stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub credential: String,
}

/// Result of a login attempt. A previously unseen username is registered
/// on the spot, and callers can tell the two cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Login {
    ExistingPlayer(Player),
    NewlyRegisteredPlayer(Player),
}

impl Login {
    pub fn player(&self) -> &Player {
        match self {
            Login::ExistingPlayer(p) | Login::NewlyRegisteredPlayer(p) => p,
        }
    }

    pub fn into_player(self) -> Player {
        match self {
            Login::ExistingPlayer(p) | Login::NewlyRegisteredPlayer(p) => p,
        }
    }
}

//=========================================================================================
// GameSession
//=========================================================================================

/// One round of the guessing game.
///
/// `masked` always has the same number of characters as `word`, and
/// `finished` is true exactly when `masked` holds no [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub player_id: PlayerId,
    pub level: Level,
    word: String,
    masked: String,
    failures: u32,
    finished: bool,
    /// Bumped by the store on every successful update.
    pub version: i64,
    pub started_at: DateTime<Utc>,
}

/// What a single guess did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    pub was_correct: bool,
    /// False when the session was already finished and nothing changed.
    pub applied: bool,
}

impl GameSession {
    /// Starts a fresh session with every position masked.
    pub fn new(player_id: PlayerId, level: Level, word: impl Into<String>) -> Self {
        let word = word.into();
        let masked = std::iter::repeat(UNKNOWN).take(word.chars().count()).collect();
        Self {
            player_id,
            level,
            finished: word.is_empty(),
            word,
            masked,
            failures: 0,
            version: 0,
            started_at: Utc::now(),
        }
    }

    /// Rebuilds a session from stored columns. Returns `None` when the stored
    /// progress does not line up with the stored word.
    pub fn restore(
        player_id: PlayerId,
        level: Level,
        word: String,
        masked: String,
        failures: u32,
        version: i64,
        started_at: DateTime<Utc>,
    ) -> Option<Self> {
        if masked.chars().count() != word.chars().count() {
            return None;
        }
        let finished = !masked.contains(UNKNOWN);
        Some(Self {
            player_id,
            level,
            word,
            masked,
            failures,
            finished,
            version,
            started_at,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn masked(&self) -> &str {
        &self.masked
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reveals every position of the word equal to `letter`.
    ///
    /// A guess that matches nothing costs one failure. Matching an already
    /// revealed letter again still counts as correct. Once finished the
    /// session no longer changes; the outcome only reports whether the
    /// letter occurs in the word.
    pub fn apply_guess(&mut self, letter: char) -> GuessOutcome {
        let was_correct = self.word.chars().any(|c| c == letter);
        if self.finished {
            return GuessOutcome {
                was_correct,
                applied: false,
            };
        }

        if was_correct {
            self.masked = self
                .word
                .chars()
                .zip(self.masked.chars())
                .map(|(w, m)| if w == letter { letter } else { m })
                .collect();
        } else {
            self.failures += 1;
        }
        self.finished = !self.masked.contains(UNKNOWN);

        GuessOutcome {
            was_correct,
            applied: true,
        }
    }
}

//=========================================================================================
// Leaderboard
//=========================================================================================

/// A player's aggregated results over completed sessions at one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// 1-based position in the full ranking.
    pub rank: u64,
    pub player_id: PlayerId,
    pub username: String,
    pub average_failures: f64,
    pub completed_games: u64,
}
