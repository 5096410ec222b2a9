//! Trend evaluation over chronological series

use magic_screener::analysis::{AbstainReason, TrendEvaluator, TrendOutcome, TrendWindow};
use magic_screener::models::{TrendCriterion, MAX_TREND_YEARS};
use magic_screener::statements::FinancialSeries;
use pretty_assertions::assert_eq;
use test_log::test;

fn fcf(n: usize) -> TrendWindow {
    TrendWindow::new(TrendCriterion::FreeCashFlow, n)
}

#[test]
fn test_equal_neighbours_fail() {
    let flat = FinancialSeries::from(vec![1.0, 2.0, 2.0]);
    assert!(!TrendEvaluator::evaluate(Some(&flat), &fcf(3)).passed());
}

#[test]
fn test_short_series_abstains_for_every_window() {
    for len in 0..MAX_TREND_YEARS {
        let series = FinancialSeries::from((0..len).map(|v| v as f64 + 1.0).collect::<Vec<_>>());
        for n in (len + 1)..=MAX_TREND_YEARS {
            let outcome = TrendEvaluator::evaluate(Some(&series), &fcf(n));
            assert!(!outcome.passed(), "len {} window {}", len, n);
            assert!(outcome.labeled_window().is_empty());
        }
    }
}

#[test]
fn test_window_is_clamped() {
    assert_eq!(fcf(10).effective(), Some(MAX_TREND_YEARS));

    let series = FinancialSeries::from(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let outcome = TrendEvaluator::evaluate(Some(&series), &fcf(10));
    assert_eq!(outcome.labeled_window().len(), MAX_TREND_YEARS);
    assert!(outcome.passed());
}

#[test]
fn test_single_year_window_abstains() {
    let series = FinancialSeries::from(vec![1.0, 2.0]);
    assert!(matches!(
        TrendEvaluator::evaluate(Some(&series), &fcf(1)),
        TrendOutcome::Abstained(AbstainReason::WindowTooSmall)
    ));
}

#[test]
fn test_missing_series_abstains() {
    assert!(matches!(
        TrendEvaluator::evaluate(None, &fcf(3)),
        TrendOutcome::Abstained(AbstainReason::NoData)
    ));
}
