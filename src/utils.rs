use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use polars::prelude::DataFrame;

use crate::models::SCORE;

/// Rank tickers against a typed query, best match first.
/// An empty query returns the first `limit` tickers unchanged.
pub fn search_tickers(universe: &[String], query: &str, limit: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return universe.iter().take(limit).cloned().collect();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(i64, &String)> = universe
        .iter()
        .filter_map(|t| matcher.fuzzy_match(t, query).map(|s| (s, t)))
        .collect();

    // exact symbol first, then best score, then alphabetical
    scored.sort_by(|(sa, a), (sb, b)| {
        let exact_a = a.eq_ignore_ascii_case(query);
        let exact_b = b.eq_ignore_ascii_case(query);
        exact_b.cmp(&exact_a).then(sb.cmp(sa)).then(a.cmp(b))
    });

    scored.into_iter().take(limit).map(|(_, t)| t.clone()).collect()
}

/// Number of tickers at each score, lowest score first
pub fn score_distribution(scores: &DataFrame) -> Vec<(i64, usize)> {
    let Ok(column) = scores.column(SCORE) else {
        return Vec::new();
    };
    let Ok(values) = column.as_materialized_series().i64() else {
        return Vec::new();
    };

    let mut counts: Vec<(i64, usize)> = Vec::new();
    for score in values.into_iter().flatten() {
        match counts.iter_mut().find(|(s, _)| *s == score) {
            Some((_, n)) => *n += 1,
            None => counts.push((score, 1)),
        }
    }
    counts.sort_by_key(|(s, _)| *s);
    counts
}

/// Horizontal text bar chart of the score distribution
pub fn score_chart(scores: &DataFrame, width: usize) -> String {
    let counts = score_distribution(scores);
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if max == 0 {
        return String::new();
    }

    counts
        .iter()
        .map(|(score, n)| {
            let bar = (n * width + max - 1) / max;
            format!("score {:>2} | {:<width$} {}\n", score, "#".repeat(bar), n, width = width)
        })
        .collect()
}
