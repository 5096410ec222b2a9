//! Screen, blacklist the low scorers, then screen the remaining universe

use magic_screener::blacklist::BlacklistManager;
use magic_screener::models::frame::{has_column, tickers as frame_tickers};
use magic_screener::models::{ScreenerParams, SCORE};
use magic_screener::statements::JsonStatementStore;
use magic_screener::Screener;
use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::fixtures::TestEnv;
use crate::common::logging;

#[test]
fn test_blacklist_round_trip_excludes_low_scores() {
    logging::init_test_logging();
    logging::log_test_step("Blacklisting tickers below score 1");

    let env = TestEnv::new();
    env.write_cash_flow("GROW", &[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
    env.write_cash_flow("HALF", &[3.0, 2.0, 1.0], &[1.0, 2.0, 3.0]);
    env.write_cash_flow("FLAT", &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]);

    let store = JsonStatementStore::new(&env.config);
    let universe = store.available_tickers().unwrap();
    let screener = Screener::new(store, &env.config);
    let (scores, _) = screener.process(&universe, &ScreenerParams::default()).unwrap();

    let manager = BlacklistManager::new(&env.config);
    let saved = manager.save(&scores, 1).unwrap();
    assert_eq!(saved.tickers, vec!["FLAT"]);

    let loaded = manager.load().unwrap();
    assert_eq!(loaded.threshold_score, 1);
    assert_eq!(loaded.tickers, saved.tickers);

    let (eligible, blacklisted) = manager.partition(&universe);
    assert_eq!(eligible, vec!["GROW", "HALF"]);
    assert_eq!(blacklisted, vec!["FLAT"]);

    let (rescored, _) = screener.process(&eligible, &ScreenerParams::default()).unwrap();
    assert_eq!(frame_tickers(&rescored).unwrap(), vec!["GROW", "HALF"]);
    assert!(has_column(&rescored, SCORE));
}

#[test]
fn test_threshold_equal_score_is_kept() {
    let env = TestEnv::new();
    env.write_cash_flow("HALF", &[3.0, 2.0, 1.0], &[1.0, 2.0, 3.0]);

    let screener = Screener::new(JsonStatementStore::new(&env.config), &env.config);
    let (scores, _) = screener.process(&["HALF".to_string()], &ScreenerParams::default()).unwrap();

    let saved = BlacklistManager::new(&env.config).save(&scores, 1).unwrap();
    assert!(saved.tickers.is_empty());
}

#[test]
fn test_corrupt_blacklist_means_no_blacklist() {
    let env = TestEnv::new();
    std::fs::write(&env.config.blacklist_file, "not json at all").unwrap();

    let manager = BlacklistManager::new(&env.config);
    assert!(manager.load().is_none());

    let universe = vec!["A".to_string(), "B".to_string()];
    let (eligible, blacklisted) = manager.partition(&universe);
    assert_eq!(eligible, universe);
    assert!(blacklisted.is_empty());
}
