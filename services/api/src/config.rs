//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where game state is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        /// Unix socket directory of a managed instance. When set it replaces
        /// the host/port of `database_url`.
        socket: Option<PathBuf>,
    },
    Memory,
}

/// How player passwords are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialScheme {
    Argon2,
    Plain,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage: StorageBackend,
    pub log_level: Level,
    pub words_path: PathBuf,
    pub advanced_words_paths: Vec<PathBuf>,
    pub credential_scheme: CredentialScheme,
    pub default_page_size: u64,
}

const DEFAULT_ADVANCED_WORDS: &str =
    "./data/w2_1000.txt,./data/w3_1000.txt,./data/w4_1000.txt,./data/w5_1000.txt";

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(&std::env::vars().collect())
    }

    /// Builds the configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).cloned();

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Storage Settings ---
        let storage = match var("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
                socket: var("DATABASE_SOCKET").map(PathBuf::from),
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE_BACKEND".to_string(),
                    format!("'{}' is not one of postgres, memory", other),
                ))
            }
        };

        // --- Word Catalog Settings ---
        let words_path = var("WORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/words_en.txt"));
        let advanced_words_paths = var("ADVANCED_WORDS_PATHS")
            .unwrap_or_else(|| DEFAULT_ADVANCED_WORDS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect::<Vec<_>>();
        if advanced_words_paths.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ADVANCED_WORDS_PATHS".to_string(),
                "at least one file is required".to_string(),
            ));
        }

        // --- Player and Leaderboard Settings ---
        let credential_scheme = match var("CREDENTIAL_SCHEME")
            .unwrap_or_else(|| "argon2".to_string())
            .to_lowercase()
            .as_str()
        {
            "argon2" => CredentialScheme::Argon2,
            "plain" => CredentialScheme::Plain,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CREDENTIAL_SCHEME".to_string(),
                    format!("'{}' is not one of argon2, plain", other),
                ))
            }
        };

        let default_page_size = match var("DEFAULT_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DEFAULT_PAGE_SIZE".to_string(),
                        format!("'{}' is not a positive integer", raw),
                    )
                })?,
            None => 10,
        };

        Ok(Self {
            bind_address,
            storage,
            log_level,
            words_path,
            advanced_words_paths,
            credential_scheme,
            default_page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_with_memory_storage() {
        let config = Config::from_vars(&vars(&[("STORAGE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.advanced_words_paths.len(), 4);
        assert_eq!(config.credential_scheme, CredentialScheme::Argon2);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = Config::from_vars(&vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn managed_socket_is_picked_up() {
        let config = Config::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://hangman@localhost/hangman"),
            ("DATABASE_SOCKET", "/cloudsql/hangman"),
        ]))
        .unwrap();
        match config.storage {
            StorageBackend::Postgres { socket, .. } => {
                assert_eq!(socket, Some(PathBuf::from("/cloudsql/hangman")))
            }
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            ("DEFAULT_PAGE_SIZE", "0"),
            ("CREDENTIAL_SCHEME", "rot13"),
            ("STORAGE_BACKEND", "mysql"),
            ("BIND_ADDRESS", "nowhere"),
        ] {
            let mut map = vars(&[("STORAGE_BACKEND", "memory")]);
            map.insert(key.to_string(), value.to_string());
            let err = Config::from_vars(&map).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == key));
        }
    }

    #[test]
    fn advanced_paths_are_split_and_trimmed() {
        let config = Config::from_vars(&vars(&[
            ("STORAGE_BACKEND", "memory"),
            ("ADVANCED_WORDS_PATHS", "a.txt, b.txt ,"),
        ]))
        .unwrap();
        assert_eq!(
            config.advanced_words_paths,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }
}
