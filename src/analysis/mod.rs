pub mod aggregator;
pub mod score;
pub mod trend;

pub use aggregator::{feature_frame, score_frame, BatchOutcome, ScoreAggregator, TickerRecords};
pub use score::ScoreCalculator;
pub use trend::{AbstainReason, TrendEvaluator, TrendOutcome, TrendWindow};
