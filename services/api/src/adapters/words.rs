//! services/api/src/adapters/words.rs
//!
//! File-backed implementation of the `WordSource` port.
//!
//! The basic pool is a plain list with one word per line. The advanced pool
//! is spread over several frequency files whose lines look like
//! `<rank> <word, possibly several tokens>`.

use async_trait::async_trait;
use hangman_core::domain::Level;
use hangman_core::ports::{PortError, PortResult, WordSource};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FileWordSource {
    basic: PathBuf,
    advanced: Vec<PathBuf>,
}

impl FileWordSource {
    pub fn new(basic: PathBuf, advanced: Vec<PathBuf>) -> Self {
        Self { basic, advanced }
    }
}

#[async_trait]
impl WordSource for FileWordSource {
    async fn load(&self, level: Level) -> PortResult<Vec<String>> {
        match level {
            Level::Basic => Ok(parse_plain(&read(&self.basic).await?)),
            Level::Advanced => {
                let mut words = Vec::new();
                for path in &self.advanced {
                    words.extend(parse_ranked(&read(path).await?));
                }
                Ok(words)
            }
        }
    }
}

async fn read(path: &Path) -> PortResult<String> {
    debug!(path = %path.display(), "Reading word file");
    tokio::fs::read_to_string(path).await.map_err(|e| {
        PortError::CatalogUnavailable(format!("cannot read {}: {}", path.display(), e))
    })
}

/// One trimmed word per non-blank line.
pub fn parse_plain(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops the leading rank token and re-joins the rest with single spaces.
pub fn parse_ranked(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let word = line.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
            (!word.is_empty()).then_some(word)
        })
        .collect()
}
