pub mod credentials;
pub mod db;
pub mod words;

pub use credentials::Argon2Credentials;
pub use db::{DbAdapter, PgConnector};
pub use words::FileWordSource;
