//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Credentials, DbAdapter, FileWordSource, PgConnector},
    config::{Config, CredentialScheme, StorageBackend},
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::Router;
use hangman_core::{
    CredentialPolicy, HangmanService, InMemoryStore, LeaderboardQuery, PlainCredentials,
    PlayerDirectory, SessionStore, WordCatalog,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type Stores = (
    Arc<dyn SessionStore>,
    Arc<dyn PlayerDirectory>,
    Arc<dyn LeaderboardQuery>,
);

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let (sessions, players, leaderboard): Stores = match &config.storage {
        StorageBackend::Postgres {
            database_url,
            socket,
        } => {
            info!(socket = ?socket, "Connecting to database...");
            let connector = PgConnector::new(database_url, socket.as_deref())?;
            let db_adapter = Arc::new(DbAdapter::connect(connector).await?);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            (db_adapter.clone(), db_adapter.clone(), db_adapter)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; games are lost on restart");
            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store.clone(), store)
        }
    };

    // --- 3. Initialize the Word Catalog & Credential Policy ---
    let catalog = Arc::new(WordCatalog::new(Arc::new(FileWordSource::new(
        config.words_path.clone(),
        config.advanced_words_paths.clone(),
    ))));
    let credentials: Arc<dyn CredentialPolicy> = match config.credential_scheme {
        CredentialScheme::Argon2 => Arc::new(Argon2Credentials::new()),
        CredentialScheme::Plain => {
            warn!("Passwords are stored in plain text");
            Arc::new(PlainCredentials)
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        service: HangmanService::new(sessions, players, leaderboard, catalog, credentials),
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
