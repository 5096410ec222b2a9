use polars::prelude::*;
use tracing::{debug, info, warn};

use super::trend::{TrendEvaluator, TrendOutcome, TrendWindow};
use crate::error::{ScreenerResult, SkipReason};
use crate::models::{FeatureRecord, ScoreRecord, ScreenerParams, TrendCriterion, TICKER};
use crate::statements::StatementSource;

/// Both records produced for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TickerRecords {
    pub features: FeatureRecord,
    pub scores: ScoreRecord,
}

/// Result of a batch run. Skipped tickers appear in neither frame.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub scores: DataFrame,
    pub features: DataFrame,
    pub skipped: Vec<(String, SkipReason)>,
}

impl BatchOutcome {
    pub fn empty(skipped: Vec<(String, SkipReason)>) -> Self {
        Self { scores: DataFrame::empty(), features: DataFrame::empty(), skipped }
    }
}

/// Runs every registered trend criterion over a list of tickers
pub struct ScoreAggregator<'a, S: StatementSource> {
    source: &'a S,
    criteria: &'static [TrendCriterion],
}

impl<'a, S: StatementSource> ScoreAggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, criteria: TrendCriterion::all() }
    }

    pub fn criteria(&self) -> &'static [TrendCriterion] {
        self.criteria
    }

    /// Score one ticker. Missing statement data is an abstention for every
    /// criterion, not a skip.
    pub fn score_ticker(&self, ticker: &str, params: &ScreenerParams) -> Result<TickerRecords, SkipReason> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(SkipReason::InvalidTicker);
        }

        let statements = self
            .source
            .load(ticker)
            .map_err(|e| SkipReason::Load(e.to_string()))?;

        let mut features = FeatureRecord { ticker: ticker.to_string(), values: Vec::new() };
        let mut scores = ScoreRecord { ticker: ticker.to_string(), criteria: Vec::new() };

        for &criterion in self.criteria {
            let series = match &statements {
                Some(table) => Some(table.series(criterion.metric_key()).map_err(|e| {
                    SkipReason::Evaluate {
                        criterion: criterion.column_name().to_string(),
                        message: e.to_string(),
                    }
                })?),
                None => None,
            };

            let window = TrendWindow::new(criterion, params.window(criterion));
            let outcome = TrendEvaluator::evaluate(series.as_ref(), &window);
            if let TrendOutcome::Abstained(reason) = &outcome {
                debug!("{} abstained for {}: {:?}", criterion.column_name(), ticker, reason);
            }

            features.values.extend(outcome.labeled_window().iter().cloned());
            scores.criteria.push((criterion, outcome.passed()));
        }

        Ok(TickerRecords { features, scores })
    }

    /// Score a batch, keeping input order. One bad ticker never stops the rest.
    pub fn run(&self, tickers: &[String], params: &ScreenerParams) -> ScreenerResult<BatchOutcome> {
        info!("🔍 Scoring {} tickers", tickers.len());

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for ticker in tickers {
            match self.score_ticker(ticker, params) {
                Ok(r) => records.push(r),
                Err(reason) => {
                    warn!("❌ Skipping {}: {}", ticker, reason);
                    skipped.push((ticker.clone(), reason));
                }
            }
        }

        info!("✅ Scored {} tickers, skipped {}", records.len(), skipped.len());

        if records.is_empty() {
            return Ok(BatchOutcome::empty(skipped));
        }

        let (features, scores): (Vec<_>, Vec<_>) =
            records.into_iter().map(|r| (r.features, r.scores)).unzip();

        Ok(BatchOutcome {
            scores: score_frame(&scores, self.criteria)?,
            features: feature_frame(&features)?,
            skipped,
        })
    }
}

/// Ticker column followed by one boolean column per criterion
pub fn score_frame(records: &[ScoreRecord], criteria: &[TrendCriterion]) -> PolarsResult<DataFrame> {
    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    let mut columns = vec![Column::new(TICKER.into(), tickers)];

    for criterion in criteria {
        let passed: Vec<bool> = records
            .iter()
            .map(|record| {
                record
                    .criteria
                    .iter()
                    .find(|(c, _)| c == criterion)
                    .map(|(_, passed)| *passed)
                    .unwrap_or(false)
            })
            .collect();
        columns.push(Column::new(criterion.column_name().into(), passed));
    }

    DataFrame::new(columns)
}

/// Ticker column followed by every feature label in first-seen order.
/// Labels a ticker did not produce are null.
pub fn feature_frame(records: &[FeatureRecord]) -> PolarsResult<DataFrame> {
    let mut labels: Vec<&str> = Vec::new();
    for record in records {
        for (label, _) in &record.values {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
    }

    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    let mut columns = vec![Column::new(TICKER.into(), tickers)];

    for label in labels {
        let values: Vec<Option<f64>> = records
            .iter()
            .map(|record| {
                record
                    .values
                    .iter()
                    .find(|(l, _)| l == label)
                    .and_then(|(_, v)| *v)
            })
            .collect();
        columns.push(Column::new(label.into(), values));
    }

    DataFrame::new(columns)
}
