pub mod catalog;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod resilience;
pub mod service;

pub use catalog::WordCatalog;
pub use domain::{
    GameSession, GuessOutcome, LeaderboardRow, Level, Login, Player, PlayerId, SessionId,
};
pub use memory::InMemoryStore;
pub use ports::{
    CredentialPolicy, LeaderboardQuery, PlainCredentials, PlayerDirectory, PortError, PortResult,
    SessionStore, WordSource,
};
pub use resilience::{BackendError, Connector, Reconnecting};
pub use service::{max_page, HangmanService, LeaderboardPage, Progress};
