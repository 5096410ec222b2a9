use crate::models::{TrendCriterion, MAX_TREND_YEARS, MIN_TREND_YEARS};
use crate::statements::FinancialSeries;

/// A criterion together with the number of years it looks back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
    pub criterion: TrendCriterion,
    requested: usize,
}

impl TrendWindow {
    pub fn new(criterion: TrendCriterion, years: usize) -> Self {
        Self { criterion, requested: years }
    }

    /// Window length actually used: clamped to at most four years, and
    /// `None` when fewer than two years were asked for.
    pub fn effective(&self) -> Option<usize> {
        let n = self.requested.min(MAX_TREND_YEARS);
        if n < MIN_TREND_YEARS { None } else { Some(n) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstainReason {
    WindowTooSmall,
    NoData,
    InsufficientHistory { available: usize, required: usize },
}

/// Result of evaluating one trend criterion
#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    Decided {
        passed: bool,
        /// Labelled values, oldest first
        window: Vec<(String, Option<f64>)>,
    },
    Abstained(AbstainReason),
}

impl TrendOutcome {
    /// An abstention never passes.
    pub fn passed(&self) -> bool {
        matches!(self, TrendOutcome::Decided { passed: true, .. })
    }

    pub fn labeled_window(&self) -> &[(String, Option<f64>)] {
        match self {
            TrendOutcome::Decided { window, .. } => window,
            TrendOutcome::Abstained(_) => &[],
        }
    }
}

pub struct TrendEvaluator;

impl TrendEvaluator {
    /// Is the metric strictly increasing over the window, and is the latest
    /// value positive? Only the last `n` periods are looked at; a missing
    /// value inside them fails the trend.
    pub fn evaluate(series: Option<&FinancialSeries>, window: &TrendWindow) -> TrendOutcome {
        let Some(n) = window.effective() else {
            return TrendOutcome::Abstained(AbstainReason::WindowTooSmall);
        };

        let values = match series {
            Some(s) if !s.is_empty() => s.values(),
            _ => return TrendOutcome::Abstained(AbstainReason::NoData),
        };

        if values.len() < n {
            return TrendOutcome::Abstained(AbstainReason::InsufficientHistory {
                available: values.len(),
                required: n,
            });
        }

        let recent = &values[values.len() - n..];

        let labeled = recent
            .iter()
            .enumerate()
            .map(|(i, v)| (window.criterion.year_label(n - i), *v))
            .collect();

        let passed = match recent.iter().copied().collect::<Option<Vec<f64>>>() {
            Some(points) => {
                let is_increasing = points.windows(2).all(|pair| pair[0] < pair[1]);
                let is_last_positive = points[n - 1] > 0.0;
                is_increasing && is_last_positive
            }
            None => false,
        };

        TrendOutcome::Decided { passed, window: labeled }
    }
}
