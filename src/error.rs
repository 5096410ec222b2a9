//! Error types for the screener pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Faults while loading one ticker's statement data.
///
/// These never abort a batch: the aggregator turns them into a [`SkipReason`].
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Failed to read statement file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse statement file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metric '{metric}' not present in any period")]
    MissingMetric { metric: String },
}

/// Batch-level faults surfaced to the caller.
#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("Reference data not available at {path}: {reason}")]
    ReferenceData { path: PathBuf, reason: String },

    #[error("Reference data has no '{0}' column")]
    MissingTickerColumn(String),

    #[error("Reference column '{0}' collides with an existing column")]
    ColumnConflict(String),

    #[error("Failed to write blacklist {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Table has no '{0}' column")]
    UnknownColumn(String),

    #[error("Table error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults raised by a live-metrics provider for one ticker.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error for {ticker}: {message}")]
    Http { ticker: String, message: String },

    #[error("Unexpected response for {ticker}: {message}")]
    Response { ticker: String, message: String },
}

/// Why a ticker was left out of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The statement source failed for this ticker.
    Load(String),
    /// Loaded fine, but a criterion could not be evaluated.
    Evaluate { criterion: String, message: String },
    /// Empty or whitespace-only symbol.
    InvalidTicker,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Load(msg) => write!(f, "load failed: {}", msg),
            SkipReason::Evaluate { criterion, message } => {
                write!(f, "{} failed: {}", criterion, message)
            }
            SkipReason::InvalidTicker => write!(f, "invalid ticker symbol"),
        }
    }
}

pub type ScreenerResult<T> = std::result::Result<T, ScreenerError>;
