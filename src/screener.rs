use polars::prelude::DataFrame;
use tracing::info;

use crate::analysis::{BatchOutcome, ScoreAggregator, ScoreCalculator};
use crate::error::{ScreenerResult, SkipReason};
use crate::models::frame::{order_rows_by_tickers, sort_by_score, tickers as frame_tickers};
use crate::models::{ScreenerConfig, ScreenerParams, TrendCriterion};
use crate::reference::ReferenceJoiner;
use crate::statements::StatementSource;

/// Scored and joined output of one batch
#[derive(Debug, Clone)]
pub struct ScreenResult {
    pub scores: DataFrame,
    pub features: DataFrame,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Batch entry point: score, join reference data, sort.
pub struct Screener<S: StatementSource> {
    source: S,
    joiner: ReferenceJoiner,
}

impl<S: StatementSource> Screener<S> {
    pub fn new(source: S, config: &ScreenerConfig) -> Self {
        Self { source, joiner: ReferenceJoiner::new(config) }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Score `tickers` and return (scores, features). Empty input gives two
    /// empty tables.
    pub fn process(
        &self,
        tickers: &[String],
        params: &ScreenerParams,
    ) -> ScreenerResult<(DataFrame, DataFrame)> {
        let result = self.screen(tickers, params)?;
        Ok((result.scores, result.features))
    }

    /// Like [`Screener::process`], also reporting the tickers that were skipped.
    pub fn screen(&self, tickers: &[String], params: &ScreenerParams) -> ScreenerResult<ScreenResult> {
        let windows: Vec<String> = TrendCriterion::all()
            .iter()
            .map(|c| format!("{}={}", c.param_name(), params.window(*c)))
            .collect();
        info!("⚙️ Screening with {}", windows.join(", "));

        let BatchOutcome { scores, features, skipped } =
            ScoreAggregator::new(&self.source).run(tickers, params)?;

        if scores.height() == 0 {
            return Ok(ScreenResult {
                scores: DataFrame::empty(),
                features: DataFrame::empty(),
                skipped,
            });
        }

        let scores = ScoreCalculator::score(&scores)?;
        let (scores, features, _) = self.joiner.join(&scores, &features)?;

        let scores = sort_by_score(&scores)?;
        let features = order_rows_by_tickers(&features, &frame_tickers(&scores)?)?;

        info!("📊 Screened {} tickers ({} skipped)", scores.height(), skipped.len());
        Ok(ScreenResult { scores, features, skipped })
    }
}
