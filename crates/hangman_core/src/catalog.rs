//! crates/hangman_core/src/catalog.rs
//!
//! The word catalog: one pool of candidate words per level, each loaded from
//! a `WordSource` the first time it is needed and kept for the lifetime of
//! the catalog instance.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::{Level, UNKNOWN};
use crate::ports::{PortError, PortResult, WordSource};

pub struct WordCatalog {
    source: Arc<dyn WordSource>,
    basic: OnceCell<Vec<String>>,
    advanced: OnceCell<Vec<String>>,
}

impl WordCatalog {
    pub fn new(source: Arc<dyn WordSource>) -> Self {
        Self {
            source,
            basic: OnceCell::new(),
            advanced: OnceCell::new(),
        }
    }

    /// A catalog over fixed in-memory pools.
    pub fn with_pools(basic: Vec<String>, advanced: Vec<String>) -> Self {
        Self::new(Arc::new(FixedWords { basic, advanced }))
    }

    /// Draws a word uniformly at random, with replacement.
    pub async fn next_word(&self, level: Level) -> PortResult<String> {
        let pool = self.pool(level).await?;
        pool.choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| PortError::CatalogUnavailable(format!("{} pool is empty", level)))
    }

    /// Number of words in a level's pool, loading it if needed.
    pub async fn pool_size(&self, level: Level) -> PortResult<usize> {
        Ok(self.pool(level).await?.len())
    }

    async fn pool(&self, level: Level) -> PortResult<&[String]> {
        let cell = match level {
            Level::Basic => &self.basic,
            Level::Advanced => &self.advanced,
        };
        let pool = cell
            .get_or_try_init(|| async {
                let words: Vec<String> = self
                    .source
                    .load(level)
                    .await?
                    .into_iter()
                    .filter(|w| !w.is_empty() && !w.contains(UNKNOWN))
                    .collect();
                if words.is_empty() {
                    return Err(PortError::CatalogUnavailable(format!(
                        "{} pool is empty",
                        level
                    )));
                }
                info!(%level, words = words.len(), "Word pool loaded");
                Ok(words)
            })
            .await?;
        Ok(pool.as_slice())
    }
}

struct FixedWords {
    basic: Vec<String>,
    advanced: Vec<String>,
}

#[async_trait]
impl WordSource for FixedWords {
    async fn load(&self, level: Level) -> PortResult<Vec<String>> {
        Ok(match level {
            Level::Basic => self.basic.clone(),
            Level::Advanced => self.advanced.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` loads, then serves a single word.
    struct FlakySource {
        loads: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl WordSource for FlakySource {
        async fn load(&self, _level: Level) -> PortResult<Vec<String>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(PortError::CatalogUnavailable("words_en.txt unreadable".into()));
            }
            Ok(vec!["kestrel".to_string()])
        }
    }

    #[tokio::test]
    async fn draws_from_the_requested_pool() {
        let catalog = WordCatalog::with_pools(vec!["cat".into()], vec!["ice cream".into()]);
        assert_eq!(catalog.next_word(Level::Basic).await.unwrap(), "cat");
        assert_eq!(catalog.next_word(Level::Advanced).await.unwrap(), "ice cream");
    }

    #[tokio::test]
    async fn draws_stay_within_the_pool() {
        let pool: Vec<String> = ["ant", "bee", "cow"].iter().map(|s| s.to_string()).collect();
        let catalog = WordCatalog::with_pools(pool.clone(), vec![]);
        for _ in 0..50 {
            let word = catalog.next_word(Level::Basic).await.unwrap();
            assert!(pool.contains(&word));
        }
    }

    #[tokio::test]
    async fn pool_is_loaded_once() {
        let source = Arc::new(FlakySource {
            loads: AtomicUsize::new(0),
            failures: 0,
        });
        let catalog = WordCatalog::new(source.clone());
        for _ in 0..5 {
            catalog.next_word(Level::Basic).await.unwrap();
        }
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let source = Arc::new(FlakySource {
            loads: AtomicUsize::new(0),
            failures: 1,
        });
        let catalog = WordCatalog::new(source.clone());
        let err = catalog.next_word(Level::Basic).await.unwrap_err();
        assert!(matches!(err, PortError::CatalogUnavailable(_)));
        assert_eq!(catalog.next_word(Level::Basic).await.unwrap(), "kestrel");
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_pool_is_unavailable() {
        let catalog = WordCatalog::with_pools(vec!["".into(), "a_b".into()], vec![]);
        let err = catalog.next_word(Level::Basic).await.unwrap_err();
        assert!(matches!(err, PortError::CatalogUnavailable(_)));
        assert!(catalog.next_word(Level::Advanced).await.is_err());
    }
}
