//! Per-ticker financial statement loading.
//!
//! Statements are stored one directory per ticker, most recent period first.
//! Everything handed out of this module is in chronological order.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StatementError;
use crate::models::ScreenerConfig;

/// Chronological values of one metric for one ticker, oldest first.
/// A period without a numeric value is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialSeries(Vec<Option<f64>>);

impl FinancialSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FinancialSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<f64>>> for FinancialSeries {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }
}

/// One ticker's statement periods in chronological order
#[derive(Debug, Clone, PartialEq)]
pub struct StatementTable {
    pub ticker: String,
    periods: Vec<Map<String, Value>>,
}

impl StatementTable {
    /// Build from periods ordered most recent first, as the source stores them.
    pub fn from_latest_first(ticker: &str, mut periods: Vec<Map<String, Value>>) -> Self {
        periods.reverse();
        Self { ticker: ticker.to_string(), periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Extract one metric as a series. Fails only when no period carries
    /// the metric at all; null or non-numeric values become `None`.
    pub fn series(&self, metric: &str) -> Result<FinancialSeries, StatementError> {
        if !self.periods.iter().any(|p| p.contains_key(metric)) {
            return Err(StatementError::MissingMetric { metric: metric.to_string() });
        }

        Ok(FinancialSeries(
            self.periods
                .iter()
                .map(|record| record.get(metric).and_then(Value::as_f64))
                .collect(),
        ))
    }
}

/// Source of per-ticker statement data
#[cfg_attr(test, mockall::automock)]
pub trait StatementSource {
    /// `Ok(None)` when the ticker has no data or zero periods.
    fn load(&self, ticker: &str) -> Result<Option<StatementTable>, StatementError>;
}

/// Reads `{dir}/{TICKER}/{TICKER}_cash-flow-statement.json`
#[derive(Debug, Clone)]
pub struct JsonStatementStore {
    statements_dir: PathBuf,
}

impl JsonStatementStore {
    pub fn new(config: &ScreenerConfig) -> Self {
        Self::with_dir(&config.statements_dir)
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self { statements_dir: dir.as_ref().to_path_buf() }
    }

    pub fn cash_flow_path(&self, ticker: &str) -> PathBuf {
        self.statements_dir
            .join(ticker)
            .join(format!("{}_cash-flow-statement.json", ticker))
    }

    /// Ticker directories under the statements dir, sorted
    pub fn available_tickers(&self) -> std::io::Result<Vec<String>> {
        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.statements_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    tickers.push(name.to_string());
                }
            }
        }
        tickers.sort();
        debug!("Found {} ticker directories in {}", tickers.len(), self.statements_dir.display());
        Ok(tickers)
    }
}

impl StatementSource for JsonStatementStore {
    fn load(&self, ticker: &str) -> Result<Option<StatementTable>, StatementError> {
        let path = self.cash_flow_path(ticker);
        if !path.exists() {
            info!("No cash flow data for {} at {}", ticker, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|source| StatementError::Io { path: path.clone(), source })?;

        let periods: Vec<Map<String, Value>> = serde_json::from_str(&content)
            .map_err(|source| StatementError::Parse { path: path.clone(), source })?;

        if periods.is_empty() {
            warn!("Cash flow data for {} is empty", ticker);
            return Ok(None);
        }

        Ok(Some(StatementTable::from_latest_first(ticker, periods)))
    }
}
