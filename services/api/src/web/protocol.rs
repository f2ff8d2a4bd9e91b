//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server.
//!
//! Every response carries an `error` field: empty on success, a human-readable
//! message otherwise.

use hangman_core::domain::LeaderboardRow;
use hangman_core::ports::PortError;
use hangman_core::service::{LeaderboardPage, Progress};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Requests Sent FROM the Client TO the Server
//=========================================================================================
// NOTE: A username seen for the first time is registered with the supplied password.
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct StartGameRequest {
    pub username: String,
    pub password: String,
    /// `basic` / `advanced`, or the stored codes `B` / `A`.
    pub level: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ProgressRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct GuessRequest {
    pub username: String,
    pub password: String,
    /// Exactly one character.
    pub letter: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    pub level: String,
    /// Zero-indexed page number.
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

//=========================================================================================
// Responses Sent FROM the Server TO the Client
//=========================================================================================

/// The state of one game as shown to its player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct GameResponse {
    pub game_id: Option<Uuid>,
    pub level: String,
    pub guess_word: String,
    pub failure_times: u32,
    pub finished: bool,
    /// Present only in answers to a guess.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_right: Option<bool>,
    pub error: String,
}

impl GameResponse {
    pub fn failure(e: &PortError) -> Self {
        Self {
            game_id: None,
            level: String::new(),
            guess_word: String::new(),
            failure_times: 0,
            finished: false,
            is_right: None,
            error: e.to_string(),
        }
    }
}

impl From<Progress> for GameResponse {
    fn from(p: Progress) -> Self {
        Self {
            game_id: Some(p.session_id.0),
            level: p.level.to_string(),
            guess_word: p.masked,
            failure_times: p.failures,
            finished: p.finished,
            is_right: p.was_correct,
            error: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct StatsRow {
    pub rank: u64,
    pub user_id: i64,
    pub username: String,
    pub avg_failures: f64,
    pub total_games: u64,
}

impl From<LeaderboardRow> for StatsRow {
    fn from(r: LeaderboardRow) -> Self {
        Self {
            rank: r.rank,
            user_id: r.player_id.0,
            username: r.username,
            avg_failures: r.average_failures,
            total_games: r.completed_games,
        }
    }
}

/// One leaderboard page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct StatsResponse {
    pub level: String,
    pub page: u64,
    pub page_size: u64,
    pub max_page: u64,
    pub total_players: u64,
    pub stats: Vec<StatsRow>,
    pub error: String,
}

impl StatsResponse {
    pub fn failure(e: &PortError) -> Self {
        Self {
            level: String::new(),
            page: 0,
            page_size: 0,
            max_page: 0,
            total_players: 0,
            stats: Vec::new(),
            error: e.to_string(),
        }
    }
}

impl From<LeaderboardPage> for StatsResponse {
    fn from(p: LeaderboardPage) -> Self {
        Self {
            level: p.level.to_string(),
            page: p.page,
            page_size: p.page_size,
            max_page: p.max_page,
            total_players: p.total_players,
            stats: p.rows.into_iter().map(StatsRow::from).collect(),
            error: String::new(),
        }
    }
}
