use polars::prelude::*;

use crate::models::frame::column_names;
use crate::models::{TrendCriterion, SCORE};

pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Add (or recompute) the `score` column as the count of true criterion
    /// cells per row, then order columns as: everything else, `score`,
    /// criterion columns.
    pub fn score(df: &DataFrame) -> PolarsResult<DataFrame> {
        if df.width() == 0 {
            return Ok(df.clone());
        }

        let names = column_names(df);
        let criteria: Vec<&str> = TrendCriterion::all()
            .iter()
            .map(|c| c.column_name())
            .filter(|name| names.iter().any(|n| n == name))
            .collect();

        let score = criteria
            .iter()
            .map(|name| col(*name).fill_null(lit(false)).cast(DataType::Int64))
            .reduce(|a, b| a + b)
            .unwrap_or_else(|| lit(0i64));

        let mut order: Vec<Expr> = names
            .iter()
            .filter(|n| n.as_str() != SCORE && !criteria.contains(&n.as_str()))
            .map(|n| col(n.as_str()))
            .collect();
        order.push(col(SCORE));
        order.extend(criteria.iter().map(|name| col(*name)));

        df.clone()
            .lazy()
            .with_column(score.alias(SCORE))
            .select(order)
            .collect()
    }
}
