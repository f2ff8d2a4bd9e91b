pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::{get_game_handler, guess_handler, health_handler, start_game_handler, stats_handler};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Builds the API router with request tracing.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/games", post(start_game_handler))
        .route("/api/games/{game_id}", post(get_game_handler))
        .route("/api/games/{game_id}/guess", post(guess_handler))
        .route("/api/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
