//! Static company metadata (name, sector, industry, country) joined onto the
//! screener tables by ticker.

use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ScreenerError, ScreenerResult};
use crate::models::frame::{column_names, has_column, ROW_INDEX};
use crate::models::{is_screener_column, ScreenerConfig, TICKER};

/// Reference listing keyed by ticker symbol, one row per ticker
#[derive(Debug, Clone)]
pub struct ReferenceInfo {
    ticker_column: String,
    columns: Vec<String>,
    frame: DataFrame,
}

impl ReferenceInfo {
    pub fn from_csv_path(path: &Path, ticker_column: &str) -> ScreenerResult<Self> {
        let file = File::open(path).map_err(|e| ScreenerError::ReferenceData {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file, ticker_column).map_err(|e| match e {
            ScreenerError::Csv(err) => ScreenerError::ReferenceData {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
            other => other,
        })
    }

    pub fn from_reader<R: Read>(reader: R, ticker_column: &str) -> ScreenerResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let ticker_idx = columns
            .iter()
            .position(|c| c == ticker_column)
            .ok_or_else(|| ScreenerError::MissingTickerColumn(ticker_column.to_string()))?;

        // column-major, so each column becomes one series
        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); columns.len()];
        let mut seen = HashSet::new();
        for record in rdr.records() {
            let record = record?;
            let row: Vec<Option<String>> = (0..columns.len())
                .map(|i| {
                    record
                        .get(i)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                })
                .collect();

            let Some(ticker) = &row[ticker_idx] else {
                continue;
            };
            if !seen.insert(ticker.clone()) {
                warn!("Duplicate reference row for {}, keeping the first", ticker);
                continue;
            }
            for (i, cell) in row.into_iter().enumerate() {
                values[i].push(cell);
            }
        }

        let frame = DataFrame::new(
            columns
                .iter()
                .zip(values)
                .map(|(name, cells)| Column::new(name.as_str().into(), cells))
                .collect(),
        )?;

        debug!("Loaded {} reference rows with columns {:?}", frame.height(), columns);
        Ok(Self { ticker_column: ticker_column.to_string(), columns, frame })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// All columns, in file order, including the ticker column
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Descriptive columns: everything except the ticker column
    pub fn info_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| *c != self.ticker_column)
    }

    /// Left join onto `df` by its ticker column. The reference columns land
    /// right after the ticker, unmatched rows get nulls, and any reference
    /// columns from an earlier join are replaced.
    pub fn join_onto(&self, df: &DataFrame) -> ScreenerResult<DataFrame> {
        if let Some(name) = self.info_columns().find(|c| is_screener_column(c)) {
            return Err(ScreenerError::ColumnConflict(name.to_string()));
        }
        if !has_column(df, TICKER) {
            return Ok(df.clone());
        }

        let mut base = df.clone();
        for name in self.info_columns() {
            if has_column(&base, name) {
                base = base.drop(name)?;
            }
        }

        let mut order = vec![col(TICKER)];
        order.extend(self.info_columns().map(col));
        order.extend(
            column_names(&base)
                .iter()
                .filter(|c| c.as_str() != TICKER)
                .map(|c| col(c.as_str())),
        );

        let joined = base
            .lazy()
            .with_row_index(ROW_INDEX, None)
            .join(
                self.frame.clone().lazy(),
                [col(TICKER)],
                [col(self.ticker_column.as_str())],
                JoinArgs::new(JoinType::Left),
            )
            .sort([ROW_INDEX], SortMultipleOptions::default().with_maintain_order(true))
            .select(order)
            .collect()?;

        Ok(joined)
    }
}

/// Joins reference data onto score and feature tables
#[derive(Debug, Clone)]
pub struct ReferenceJoiner {
    reference_file: PathBuf,
    ticker_column: String,
}

impl ReferenceJoiner {
    pub fn new(config: &ScreenerConfig) -> Self {
        Self {
            reference_file: config.reference_file.clone(),
            ticker_column: config.reference_ticker_column.clone(),
        }
    }

    pub fn load(&self) -> ScreenerResult<ReferenceInfo> {
        ReferenceInfo::from_csv_path(&self.reference_file, &self.ticker_column)
    }

    /// Join reference data onto both tables. The reference file is read once;
    /// if it is missing the whole call fails.
    pub fn join(
        &self,
        scores: &DataFrame,
        features: &DataFrame,
    ) -> ScreenerResult<(DataFrame, DataFrame, ReferenceInfo)> {
        let info = self.load()?;
        info!("📋 Loaded {} reference rows from {}", info.len(), self.reference_file.display());

        let scores = info.join_onto(scores)?;
        let features = info.join_onto(features)?;
        Ok((scores, features, info))
    }
}
