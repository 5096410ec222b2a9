//! Live market metrics appended to a scored table.
//!
//! Fetching is sequential. [`Enrichment`] yields one step per ticker so the
//! caller decides how to report progress between fetches.

use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::analysis::ScoreCalculator;
use crate::api::{
    LiveMetricsProvider, ENTERPRISE_TO_EBITDA, FORWARD_PE, HELD_PERCENT_INSIDERS, MARKET_CAP,
    TRAILING_PE,
};
use crate::error::{ProviderError, ScreenerResult};
use crate::models::frame::{has_column, string_values, tickers};
use crate::models::{self, LiveMetricsRecord, SCORE, TICKER};

/// P/E when the provider has neither trailing nor forward P/E
pub const PE_MISSING: f64 = 100_000.0;
/// P/E when the fetch itself failed
pub const PE_FETCH_FAILED: f64 = 10_000.0;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn numeric(info: &Map<String, Value>, field: &str) -> Option<f64> {
    info.get(field).and_then(Value::as_f64)
}

impl LiveMetricsRecord {
    /// Metrics for a failed fetch
    pub fn fetch_failed() -> Self {
        Self {
            p_e_ratio: PE_FETCH_FAILED,
            insider_ownership: 0.0,
            market_cap: 0.0,
            enterprise_to_ebitda: 0.0,
        }
    }

    /// Extract metrics from provider fields. Each metric falls back to its
    /// own default independently.
    pub fn from_info(info: &Map<String, Value>) -> Self {
        // trailing P/E wins whenever it is present, even if it is not a number
        let pe = [TRAILING_PE, FORWARD_PE]
            .iter()
            .find_map(|f| info.get(*f).filter(|v| !v.is_null()));

        Self {
            p_e_ratio: pe.and_then(Value::as_f64).map(|v| round_to(v, 1)).unwrap_or(PE_MISSING),
            insider_ownership: numeric(info, HELD_PERCENT_INSIDERS)
                .map(|v| round_to(v, 2))
                .unwrap_or(0.0),
            market_cap: numeric(info, MARKET_CAP).map(f64::round).unwrap_or(0.0),
            enterprise_to_ebitda: numeric(info, ENTERPRISE_TO_EBITDA)
                .map(|v| round_to(v, 2))
                .unwrap_or(0.0),
        }
    }

    pub fn from_fetch(ticker: &str, fetched: Result<Map<String, Value>, ProviderError>) -> Self {
        match fetched {
            Ok(info) => Self::from_info(&info),
            Err(e) => {
                warn!("Error fetching metrics for {}: {}", ticker, e);
                Self::fetch_failed()
            }
        }
    }
}

/// Human-scaled market cap for display, e.g. `1.2B`
pub fn humanize_market_cap(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        return format!("{:.0}", value);
    };
    format!("{:.1}{}", scaled, suffix)
}

/// One completed fetch
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentStep {
    pub ticker: String,
    pub metrics: LiveMetricsRecord,
    /// Fraction of tickers done, reaching exactly 1.0 on the last step
    pub fraction: f64,
}

/// Iterator over per-ticker fetches
pub struct Enrichment<'a, P: LiveMetricsProvider> {
    provider: &'a P,
    tickers: std::vec::IntoIter<String>,
    done: usize,
    total: usize,
}

impl<'a, P: LiveMetricsProvider> Iterator for Enrichment<'a, P> {
    type Item = EnrichmentStep;

    fn next(&mut self) -> Option<Self::Item> {
        let ticker = self.tickers.next()?;
        let metrics = LiveMetricsRecord::from_fetch(&ticker, self.provider.fetch_info(&ticker));
        self.done += 1;
        Some(EnrichmentStep {
            ticker,
            metrics,
            fraction: self.done as f64 / self.total as f64,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tickers.size_hint()
    }
}

pub struct LiveMetricsEnricher<P: LiveMetricsProvider> {
    provider: P,
}

impl<P: LiveMetricsProvider> LiveMetricsEnricher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn iter(&self, tickers: Vec<String>) -> Enrichment<'_, P> {
        let total = tickers.len();
        Enrichment { provider: &self.provider, tickers: tickers.into_iter(), done: 0, total }
    }

    /// Fetch metrics for every row and append the metric columns. When the
    /// frame carries a score, columns are re-ordered so score and criteria
    /// stay last.
    pub fn enrich(
        &self,
        df: &DataFrame,
        mut on_progress: Option<&mut dyn FnMut(f64)>,
    ) -> ScreenerResult<DataFrame> {
        let steps: Vec<EnrichmentStep> = self
            .iter(tickers(df)?)
            .inspect(|step| {
                if let Some(report) = on_progress.as_mut() {
                    report(step.fraction);
                }
            })
            .collect();

        info!("📈 Fetched live metrics for {} tickers", steps.len());
        append_metrics(df, &steps)
    }
}

/// Append the live metric columns to `df`, matching rows by ticker.
/// Rows without a step get nulls.
pub fn append_metrics(df: &DataFrame, steps: &[EnrichmentStep]) -> ScreenerResult<DataFrame> {
    let mut enriched = df.clone();
    for name in [models::P_E_RATIO, models::INSIDER_OWNERSHIP, models::MARKET_CAP, models::ENTERPRISE_TO_EBITDA] {
        if has_column(&enriched, name) {
            enriched = enriched.drop(name)?;
        }
    }

    let per_row: Vec<Option<&LiveMetricsRecord>> = if has_column(&enriched, TICKER) {
        string_values(&enriched, TICKER)?
            .iter()
            .map(|t| {
                t.as_deref()
                    .and_then(|t| steps.iter().find(|s| s.ticker == t))
                    .map(|s| &s.metrics)
            })
            .collect()
    } else {
        vec![None; enriched.height()]
    };

    let number = |extract: fn(&LiveMetricsRecord) -> f64| -> Vec<Option<f64>> {
        per_row.iter().map(|m| m.map(extract)).collect()
    };
    let market_cap: Vec<Option<String>> = per_row
        .iter()
        .map(|m| m.map(|m| humanize_market_cap(m.market_cap)))
        .collect();

    enriched.with_column(Column::new(models::P_E_RATIO.into(), number(|m| m.p_e_ratio)))?;
    enriched.with_column(Column::new(
        models::INSIDER_OWNERSHIP.into(),
        number(|m| m.insider_ownership),
    ))?;
    enriched.with_column(Column::new(models::MARKET_CAP.into(), market_cap))?;
    enriched.with_column(Column::new(
        models::ENTERPRISE_TO_EBITDA.into(),
        number(|m| m.enterprise_to_ebitda),
    ))?;

    if has_column(&enriched, SCORE) {
        Ok(ScoreCalculator::score(&enriched)?)
    } else {
        Ok(enriched)
    }
}
