//! On-disk fixtures: statement files, a reference listing and a config
//! pointing at them, all inside one temp directory.

use magic_screener::models::ScreenerConfig;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const REFERENCE_CSV: &str = "Ticker,Company,Sector,Industry,Country\n\
    GROW,Growth Corp,Technology,Software - Application,USA\n\
    FLAT,Flat Industries,Industrials,Machinery,USA\n\
    HALF,Half Holdings,Energy,Oil & Gas,Canada\n";

pub struct TestEnv {
    pub dir: TempDir,
    pub config: ScreenerConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let statements_dir = dir.path().join("fmp");
        fs::create_dir_all(&statements_dir).expect("Failed to create statements dir");

        let reference_file = dir.path().join("all_stocks_tickers.csv");
        fs::write(&reference_file, REFERENCE_CSV).expect("Failed to write reference file");

        let config = ScreenerConfig {
            statements_dir,
            reference_file,
            blacklist_file: dir.path().join("blacklist.json"),
            ..ScreenerConfig::default()
        };
        Self { dir, config }
    }

    /// Write a cash flow statement. Values are given oldest first and stored
    /// most recent first.
    pub fn write_cash_flow(&self, ticker: &str, fcf: &[f64], ocf: &[f64]) {
        let periods: Vec<_> = fcf
            .iter()
            .zip(ocf)
            .enumerate()
            .rev()
            .map(|(i, (f, o))| {
                json!({
                    "date": format!("{}-12-31", 2018 + i),
                    "symbol": ticker,
                    "freeCashFlow": f,
                    "operatingCashFlow": o
                })
            })
            .collect();
        self.write_raw(ticker, &serde_json::to_string_pretty(&periods).expect("serialize"));
    }

    pub fn write_raw(&self, ticker: &str, body: &str) {
        let ticker_dir = self.config.statements_dir.join(ticker);
        fs::create_dir_all(&ticker_dir).expect("Failed to create ticker dir");
        fs::write(ticker_dir.join(format!("{}_cash-flow-statement.json", ticker)), body)
            .expect("Failed to write statement");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Cell readers over result frames
pub mod cells {
    use polars::prelude::DataFrame;

    pub fn int(df: &DataFrame, column: &str, row: usize) -> Option<i64> {
        df.column(column).ok()?.as_materialized_series().i64().ok()?.get(row)
    }

    pub fn float(df: &DataFrame, column: &str, row: usize) -> Option<f64> {
        df.column(column).ok()?.as_materialized_series().f64().ok()?.get(row)
    }

    pub fn text(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        df.column(column)
            .ok()?
            .as_materialized_series()
            .str()
            .ok()?
            .get(row)
            .map(str::to_string)
    }

    pub fn names(df: &DataFrame) -> Vec<String> {
        df.get_columns().iter().map(|c| c.name().to_string()).collect()
    }
}
