//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    GameResponse, GuessRequest, ProgressRequest, StartGameRequest, StatsQuery, StatsResponse,
    StatsRow,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use hangman_core::domain::{Level, Login, PlayerId, SessionId};
use hangman_core::ports::{PortError, PortResult};
use hangman_core::service::Progress;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        start_game_handler,
        get_game_handler,
        guess_handler,
        stats_handler,
    ),
    components(
        schemas(StartGameRequest, ProgressRequest, GuessRequest, GameResponse, StatsResponse, StatsRow)
    ),
    tags(
        (name = "Hangman API", description = "Start games, guess letters and browse the leaderboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// The HTTP status a port error is reported with.
pub fn status_for(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::CredentialMismatch(_) => StatusCode::UNAUTHORIZED,
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::StorageUnavailable(_) | PortError::CatalogUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(action: &str, e: &PortError) {
    if status_for(e).is_server_error() {
        error!("Failed to {}: {:?}", action, e);
    } else {
        info!("Rejected request to {}: {}", action, e);
    }
}

fn respond(action: &str, result: PortResult<Progress>, ok: StatusCode) -> (StatusCode, Json<GameResponse>) {
    match result {
        Ok(progress) => (ok, Json(GameResponse::from(progress))),
        Err(e) => {
            log_failure(action, &e);
            (status_for(&e), Json(GameResponse::failure(&e)))
        }
    }
}

//=========================================================================================
// Request Parsing
//=========================================================================================

fn parse_level(raw: &str) -> PortResult<Level> {
    raw.parse::<Level>().map_err(PortError::InvalidInput)
}

/// Unparseable ids are reported like unknown ones.
fn parse_game_id(raw: &str) -> PortResult<SessionId> {
    raw.parse::<SessionId>().map_err(|_| {
        PortError::NotFound(format!("game_id {} does not exist for given user", raw))
    })
}

fn parse_letter(raw: &str) -> PortResult<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(PortError::InvalidInput(format!(
            "'{}' is not a single letter",
            raw
        ))),
    }
}

async fn authenticate(state: &AppState, username: &str, password: &str) -> PortResult<PlayerId> {
    let login = state.service.login_or_register(username, password).await?;
    if let Login::NewlyRegisteredPlayer(player) = &login {
        info!(username = %player.username, "First request registered a new player");
    }
    Ok(login.player().id)
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Start a new game.
///
/// The player is resolved from the username and password; an unseen username
/// is registered on the spot.
#[utoipa::path(
    post,
    path = "/api/games",
    request_body = StartGameRequest,
    responses(
        (status = 201, description = "Game started", body = GameResponse),
        (status = 400, description = "Unknown level", body = GameResponse),
        (status = 401, description = "Wrong password", body = GameResponse),
        (status = 503, description = "Storage or word list unavailable", body = GameResponse)
    )
)]
pub async fn start_game_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartGameRequest>,
) -> (StatusCode, Json<GameResponse>) {
    let result = async {
        let level = parse_level(&req.level)?;
        let player = authenticate(&state, &req.username, &req.password).await?;
        state.service.start_session(player, level).await
    }
    .await;
    respond("start game", result, StatusCode::CREATED)
}

/// Fetch the current state of one of the player's games.
#[utoipa::path(
    post,
    path = "/api/games/{game_id}",
    request_body = ProgressRequest,
    params(
        ("game_id" = String, Path, description = "The game's ID.")
    ),
    responses(
        (status = 200, description = "Current progress", body = GameResponse),
        (status = 401, description = "Wrong password", body = GameResponse),
        (status = 404, description = "No such game for this player", body = GameResponse)
    )
)]
pub async fn get_game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> (StatusCode, Json<GameResponse>) {
    let result = async {
        let player = authenticate(&state, &req.username, &req.password).await?;
        let game_id = parse_game_id(&game_id)?;
        state.service.get_progress(game_id, player).await
    }
    .await;
    respond("load game", result, StatusCode::OK)
}

/// Guess one letter.
#[utoipa::path(
    post,
    path = "/api/games/{game_id}/guess",
    request_body = GuessRequest,
    params(
        ("game_id" = String, Path, description = "The game's ID.")
    ),
    responses(
        (status = 200, description = "Guess applied", body = GameResponse),
        (status = 400, description = "Not a single letter", body = GameResponse),
        (status = 404, description = "No such game for this player", body = GameResponse),
        (status = 409, description = "The game was updated concurrently", body = GameResponse)
    )
)]
pub async fn guess_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(req): Json<GuessRequest>,
) -> (StatusCode, Json<GameResponse>) {
    let result = async {
        let letter = parse_letter(&req.letter)?;
        let player = authenticate(&state, &req.username, &req.password).await?;
        let game_id = parse_game_id(&game_id)?;
        state.service.apply_guess(game_id, player, letter).await
    }
    .await;
    respond("guess", result, StatusCode::OK)
}

/// Leaderboard for one level, ranked by average failures.
#[utoipa::path(
    get,
    path = "/api/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "One page of the leaderboard", body = StatsResponse),
        (status = 400, description = "Unknown level or zero page size", body = StatsResponse)
    )
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> (StatusCode, Json<StatsResponse>) {
    let page = query.page.unwrap_or(0);
    let page_size = query.page_size.unwrap_or(state.config.default_page_size);
    let result = async {
        let level = parse_level(&query.level)?;
        state.service.rank(level, page, page_size).await
    }
    .await;
    match result {
        Ok(page) => (StatusCode::OK, Json(StatsResponse::from(page))),
        Err(e) => {
            log_failure("load stats", &e);
            (status_for(&e), Json(StatsResponse::failure(&e)))
        }
    }
}

pub async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hangman_core::catalog::WordCatalog;
    use hangman_core::memory::InMemoryStore;
    use hangman_core::ports::PlainCredentials;
    use hangman_core::service::HangmanService;
    use std::collections::HashMap;

    fn state() -> Arc<AppState> {
        let vars: HashMap<String, String> =
            [("STORAGE_BACKEND".to_string(), "memory".to_string())].into();
        let store = Arc::new(InMemoryStore::new());
        let catalog = WordCatalog::with_pools(vec!["cat".into()], vec!["of the".into()]);
        Arc::new(AppState {
            service: HangmanService::new(
                store.clone(),
                store.clone(),
                store,
                Arc::new(catalog),
                Arc::new(PlainCredentials),
            ),
            config: Arc::new(Config::from_vars(&vars).unwrap()),
        })
    }

    async fn start(state: &Arc<AppState>, username: &str) -> GameResponse {
        let (status, Json(body)) = start_game_handler(
            State(state.clone()),
            Json(StartGameRequest {
                username: username.into(),
                password: "pw".into(),
                level: "basic".into(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn guess(state: &Arc<AppState>, game_id: &str, username: &str, letter: &str) -> (StatusCode, GameResponse) {
        let (status, Json(body)) = guess_handler(
            State(state.clone()),
            Path(game_id.to_string()),
            Json(GuessRequest {
                username: username.into(),
                password: "pw".into(),
                letter: letter.into(),
            }),
        )
        .await;
        (status, body)
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(status_for(&PortError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&PortError::CredentialMismatch("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&PortError::StorageUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(&PortError::Conflict("x".into())), StatusCode::CONFLICT);
    }

    #[test]
    fn letters_must_be_single_chars() {
        assert_eq!(parse_letter("a").unwrap(), 'a');
        assert_eq!(parse_letter(" ").unwrap(), ' ');
        assert!(parse_letter("").is_err());
        assert!(parse_letter("ab").is_err());
    }

    #[tokio::test]
    async fn game_flow_over_handlers() {
        let state = state();
        let started = start(&state, "alice").await;
        assert_eq!(started.guess_word, "___");
        assert!(started.error.is_empty());
        let id = started.game_id.unwrap().to_string();

        let (status, body) = guess(&state, &id, "alice", "a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.guess_word, "_a_");
        assert_eq!(body.is_right, Some(true));

        let (_, body) = guess(&state, &id, "alice", "z").await;
        assert_eq!(body.failure_times, 1);
        assert_eq!(body.is_right, Some(false));

        let (status, Json(body)) = get_game_handler(
            State(state.clone()),
            Path(id.clone()),
            Json(ProgressRequest {
                username: "alice".into(),
                password: "pw".into(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.guess_word, "_a_");
        assert_eq!(body.is_right, None);
    }

    #[tokio::test]
    async fn other_players_get_not_found_with_a_message() {
        let state = state();
        let id = start(&state, "alice").await.game_id.unwrap().to_string();

        let (status, body) = guess(&state, &id, "bob", "c").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.error.is_empty());
        assert!(body.guess_word.is_empty());

        let (status, _) = guess(&state, "not-a-uuid", "alice", "c").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = state();
        start(&state, "alice").await;
        let (status, Json(body)) = start_game_handler(
            State(state.clone()),
            Json(StartGameRequest {
                username: "alice".into(),
                password: "nope".into(),
                level: "basic".into(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "password for alice is not correct");
    }

    #[tokio::test]
    async fn empty_stats_page() {
        let state = state();
        let (status, Json(body)) = stats_handler(
            State(state.clone()),
            Query(StatsQuery {
                level: "advanced".into(),
                page: None,
                page_size: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.page_size, 10);
        assert_eq!(body.max_page, 0);
        assert!(body.stats.is_empty());

        let (status, Json(body)) = stats_handler(
            State(state),
            Query(StatsQuery {
                level: "expert".into(),
                page: None,
                page_size: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.error.is_empty());
    }
}
