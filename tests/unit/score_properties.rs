//! Score column derivation and placement

use magic_screener::analysis::{score_frame, ScoreCalculator};
use magic_screener::models::{ScoreRecord, TrendCriterion, SCORE};
use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::fixtures::cells;

fn record(ticker: &str, fcf: bool, ocf: bool) -> ScoreRecord {
    ScoreRecord {
        ticker: ticker.to_string(),
        criteria: vec![
            (TrendCriterion::FreeCashFlow, fcf),
            (TrendCriterion::OperatingCashFlow, ocf),
        ],
    }
}

#[test]
fn test_score_counts_and_sits_before_first_criterion() {
    let df = score_frame(
        &[record("A", true, true), record("B", false, true)],
        TrendCriterion::all(),
    )
    .unwrap();
    let scored = ScoreCalculator::score(&df).unwrap();

    assert_eq!(cells::int(&scored, SCORE, 0), Some(2));
    assert_eq!(cells::int(&scored, SCORE, 1), Some(1));

    let names = cells::names(&scored);
    let score_pos = names.iter().position(|n| n == SCORE).unwrap();
    assert_eq!(names[score_pos + 1], "FCF Positive Trend");
    assert_eq!(names, vec!["ticker", "score", "FCF Positive Trend", "OCF Positive Trend"]);
}

#[test]
fn test_frame_score_matches_record_score() {
    let records = vec![record("A", false, false), record("B", true, false), record("C", true, true)];
    let scored = ScoreCalculator::score(&score_frame(&records, TrendCriterion::all()).unwrap()).unwrap();

    for (i, r) in records.iter().enumerate() {
        assert_eq!(cells::int(&scored, SCORE, i), Some(r.score()));
    }
}
