//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use hangman_core::service::HangmanService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: HangmanService,
    pub config: Arc<Config>,
}
