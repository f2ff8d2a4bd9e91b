//! crates/hangman_core/src/resilience.rs
//!
//! The reconnect rule shared by every storage operation: attempt, and if the
//! backend reports the connection as broken, reconnect once and attempt once
//! more. A second connectivity failure is `StorageUnavailable`.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::ports::{PortError, PortResult};

/// How a backend failure is classified by the adapter that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The connection is no longer usable. Worth one reconnect.
    Transient(String),
    /// A data or query error. Surfaced as-is, never retried.
    Fatal(PortError),
}

impl From<PortError> for BackendError {
    fn from(e: PortError) -> Self {
        BackendError::Fatal(e)
    }
}

/// Produces a live connection to the storage backend, or fails.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Send;

    async fn connect(&self) -> Result<Self::Connection, BackendError>;
}

/// A single shared connection with the bounded reconnect rule applied to
/// every operation run through it.
pub struct Reconnecting<C: Connector> {
    connector: C,
    conn: Mutex<Option<C::Connection>>,
}

impl<C: Connector> Reconnecting<C> {
    /// Wraps `connector` without connecting; the first operation connects.
    pub fn lazy(connector: C) -> Self {
        Self {
            connector,
            conn: Mutex::new(None),
        }
    }

    /// Connects immediately so configuration problems surface at startup.
    pub async fn connect(connector: C) -> PortResult<Self> {
        let conn = connector.connect().await.map_err(unavailable)?;
        Ok(Self {
            connector,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Runs `op` against the shared connection.
    ///
    /// `op` may be invoked twice, so it must rebuild its query from owned
    /// data on each call. Operations are serialized on the connection.
    pub async fn run<T, F>(&self, label: &str, mut op: F) -> PortResult<T>
    where
        T: Send,
        F: for<'c> FnMut(&'c mut C::Connection) -> BoxFuture<'c, Result<T, BackendError>> + Send,
    {
        let mut guard = self.conn.lock().await;

        let first = match guard.as_mut() {
            Some(conn) => op(conn).await,
            None => Err(BackendError::Transient("not connected".to_string())),
        };
        match first {
            Ok(value) => return Ok(value),
            Err(BackendError::Fatal(e)) => return Err(e),
            Err(BackendError::Transient(reason)) => {
                warn!(operation = label, %reason, "Storage connection lost, reconnecting");
            }
        }

        *guard = None;
        let fresh = self.connector.connect().await.map_err(unavailable)?;
        info!(operation = label, "Storage connection re-established");
        let conn = guard.insert(fresh);

        match op(conn).await {
            Ok(value) => Ok(value),
            Err(BackendError::Fatal(e)) => Err(e),
            Err(BackendError::Transient(reason)) => {
                *guard = None;
                Err(PortError::StorageUnavailable(format!(
                    "{} failed after reconnect: {}",
                    label, reason
                )))
            }
        }
    }
}

fn unavailable(e: BackendError) -> PortError {
    match e {
        BackendError::Transient(reason) => PortError::StorageUnavailable(reason),
        BackendError::Fatal(PortError::StorageUnavailable(reason)) => {
            PortError::StorageUnavailable(reason)
        }
        BackendError::Fatal(other) => PortError::StorageUnavailable(other.to_string()),
    }
}
