//! Persisted list of low-scoring tickers to leave out of future screens.

use chrono::Local;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ScreenerError, ScreenerResult};
use crate::models::frame::{has_column, tickers};
use crate::models::{BlacklistEntry, ScreenerConfig, SCORE, TICKER};

pub struct BlacklistManager {
    path: PathBuf,
}

impl BlacklistManager {
    pub fn new(config: &ScreenerConfig) -> Self {
        Self::with_path(&config.blacklist_file)
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blacklist every ticker scoring strictly below `threshold`. The file is
    /// replaced, never merged.
    pub fn save(&self, scores: &DataFrame, threshold: i64) -> ScreenerResult<BlacklistEntry> {
        if !has_column(scores, SCORE) {
            return Err(ScreenerError::UnknownColumn(SCORE.to_string()));
        }

        let below = scores
            .clone()
            .lazy()
            .filter(col(SCORE).lt(lit(threshold)))
            .select([col(TICKER)])
            .collect()?;
        let tickers = tickers(&below)?;

        let entry = BlacklistEntry::new(threshold, tickers, Local::now());
        let persistence = |reason: String| ScreenerError::Persistence { path: self.path.clone(), reason };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&entry).map_err(|e| persistence(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| persistence(e.to_string()))?;

        info!(
            "🚫 Blacklisted {} tickers below score {} to {}",
            entry.tickers.len(),
            threshold,
            self.path.display()
        );
        Ok(entry)
    }

    /// The stored blacklist, or `None` when missing or unreadable
    pub fn load(&self) -> Option<BlacklistEntry> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read blacklist {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring corrupt blacklist {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Split `universe` into (eligible, blacklisted), keeping input order.
    pub fn partition(&self, universe: &[String]) -> (Vec<String>, Vec<String>) {
        match self.load() {
            Some(entry) => universe.iter().cloned().partition(|t| !entry.contains(t)),
            None => (universe.to_vec(), Vec::new()),
        }
    }
}
