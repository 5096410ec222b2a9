use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod frame;

/// Ticker identifier column in both output tables
pub const TICKER: &str = "ticker";
/// Derived count of satisfied criteria
pub const SCORE: &str = "score";

/// Screener parameter names
pub const FCF_YEARS: &str = "fcf_years";
pub const OCF_YEARS: &str = "ocf_years";

/// Live metric column names
pub const P_E_RATIO: &str = "P_E_ratio";
pub const INSIDER_OWNERSHIP: &str = "insider_ownership";
pub const MARKET_CAP: &str = "Market Cap";
pub const ENTERPRISE_TO_EBITDA: &str = "EV/EBITDA";

/// Longest history a trend criterion looks at
pub const MAX_TREND_YEARS: usize = 4;
/// Fewest points needed to call a trend
pub const MIN_TREND_YEARS: usize = 2;

/// Configuration for the screener
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub statements_dir: PathBuf,
    pub reference_file: PathBuf,
    pub reference_ticker_column: String,
    pub blacklist_file: PathBuf,
    pub quote_base_url: String,
    pub rate_limit_per_minute: u32,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            statements_dir: PathBuf::from("data/fmp"),
            reference_file: PathBuf::from("data/finviz/all_stocks_tickers.csv"),
            reference_ticker_column: "Ticker".to_string(),
            blacklist_file: PathBuf::from("data/blacklist.json"),
            quote_base_url: "https://query2.finance.yahoo.com".to_string(),
            rate_limit_per_minute: 120,
        }
    }
}

impl ScreenerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();
        Ok(ScreenerConfig {
            statements_dir: std::env::var("SCREENER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.statements_dir),
            reference_file: std::env::var("SCREENER_REFERENCE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.reference_file),
            reference_ticker_column: std::env::var("SCREENER_TICKER_COLUMN")
                .unwrap_or(defaults.reference_ticker_column),
            blacklist_file: std::env::var("SCREENER_BLACKLIST_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.blacklist_file),
            quote_base_url: std::env::var("SCREENER_QUOTE_URL")
                .unwrap_or(defaults.quote_base_url),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_per_minute),
        })
    }
}

/// The registered trend criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendCriterion {
    FreeCashFlow,
    OperatingCashFlow,
}

impl TrendCriterion {
    pub fn all() -> &'static [TrendCriterion] {
        &[TrendCriterion::FreeCashFlow, TrendCriterion::OperatingCashFlow]
    }

    /// Key of the metric in the statement records
    pub fn metric_key(&self) -> &'static str {
        match self {
            TrendCriterion::FreeCashFlow => "freeCashFlow",
            TrendCriterion::OperatingCashFlow => "operatingCashFlow",
        }
    }

    /// Name of the boolean column in the score table
    pub fn column_name(&self) -> &'static str {
        match self {
            TrendCriterion::FreeCashFlow => "FCF Positive Trend",
            TrendCriterion::OperatingCashFlow => "OCF Positive Trend",
        }
    }

    pub fn label_prefix(&self) -> &'static str {
        match self {
            TrendCriterion::FreeCashFlow => "FCF",
            TrendCriterion::OperatingCashFlow => "OCF",
        }
    }

    /// Name of the window parameter for this criterion
    pub fn param_name(&self) -> &'static str {
        match self {
            TrendCriterion::FreeCashFlow => FCF_YEARS,
            TrendCriterion::OperatingCashFlow => OCF_YEARS,
        }
    }

    /// Feature label for the value `years_ago` years back, e.g. "FCF 2 Years Ago"
    pub fn year_label(&self, years_ago: usize) -> String {
        if years_ago == 1 {
            format!("{} 1 Year Ago", self.label_prefix())
        } else {
            format!("{} {} Years Ago", self.label_prefix(), years_ago)
        }
    }

    /// Whether `name` is a column this criterion produces
    pub fn owns_column(&self, name: &str) -> bool {
        name == self.column_name() || (1..=MAX_TREND_YEARS).any(|n| self.year_label(n) == name)
    }
}

/// Columns the screener itself produces. Reference data may not reuse them.
pub fn is_screener_column(name: &str) -> bool {
    [TICKER, SCORE, P_E_RATIO, INSIDER_OWNERSHIP, MARKET_CAP, ENTERPRISE_TO_EBITDA].contains(&name)
        || TrendCriterion::all().iter().any(|c| c.owns_column(name))
}

/// Per-criterion window sizes chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerParams {
    pub fcf_years: usize,
    pub ocf_years: usize,
}

impl Default for ScreenerParams {
    fn default() -> Self {
        Self { fcf_years: 3, ocf_years: 3 }
    }
}

impl ScreenerParams {
    pub fn window(&self, criterion: TrendCriterion) -> usize {
        match criterion {
            TrendCriterion::FreeCashFlow => self.fcf_years,
            TrendCriterion::OperatingCashFlow => self.ocf_years,
        }
    }
}

/// Raw windowed values behind each trend, one row per ticker
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub ticker: String,
    /// (label, value) pairs, oldest first within each criterion. A period
    /// without a numeric value is `None`.
    pub values: Vec<(String, Option<f64>)>,
}

/// Boolean criteria for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub ticker: String,
    pub criteria: Vec<(TrendCriterion, bool)>,
}

impl ScoreRecord {
    pub fn score(&self) -> i64 {
        self.criteria.iter().filter(|(_, passed)| *passed).count() as i64
    }
}

/// Point-in-time market metrics for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveMetricsRecord {
    pub p_e_ratio: f64,
    pub insider_ownership: f64,
    pub market_cap: f64,
    pub enterprise_to_ebitda: f64,
}

/// Persisted exclusion list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub date: String,
    pub threshold_score: i64,
    pub tickers: Vec<String>,
}

impl BlacklistEntry {
    pub fn new(threshold_score: i64, tickers: Vec<String>, at: DateTime<Local>) -> Self {
        Self {
            date: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            threshold_score,
            tickers,
        }
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }
}
