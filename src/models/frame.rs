//! Helpers over the polars frames that carry scores and features.

use polars::df;
use polars::prelude::*;
use std::io::Write;

use super::{SCORE, TICKER};

/// Temporary column used to pin row order across joins
pub(crate) const ROW_INDEX: &str = "__row";

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns().iter().map(|c| c.name().to_string()).collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// A string column as owned values, nulls kept
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Ticker symbols in row order. Empty when the frame has no ticker column.
pub fn tickers(df: &DataFrame) -> PolarsResult<Vec<String>> {
    if !has_column(df, TICKER) {
        return Ok(Vec::new());
    }
    Ok(string_values(df, TICKER)?.into_iter().flatten().collect())
}

/// Stable sort by score, highest first, nulls last.
pub fn sort_by_score(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.sort(
        [SCORE],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true),
    )
}

/// Reorder rows to follow `order`. Rows whose ticker is not listed go last,
/// keeping their relative order.
pub fn order_rows_by_tickers(df: &DataFrame, order: &[String]) -> PolarsResult<DataFrame> {
    if df.height() == 0 || !has_column(df, TICKER) {
        return Ok(df.clone());
    }

    let mut ranked: Vec<&str> = Vec::with_capacity(order.len());
    for t in order {
        if !ranked.contains(&t.as_str()) {
            ranked.push(t);
        }
    }
    let rank: Vec<u32> = (0..ranked.len() as u32).collect();
    let ranks = df!(TICKER => ranked, ROW_INDEX => rank)?;

    let columns: Vec<Expr> = column_names(df).iter().map(|c| col(c.as_str())).collect();
    df.clone()
        .lazy()
        .join(
            ranks.lazy(),
            [col(TICKER)],
            [col(TICKER)],
            JoinArgs::new(JoinType::Left),
        )
        .sort(
            [ROW_INDEX],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .select(columns)
        .collect()
}

/// Write the frame as CSV with a header row.
pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> PolarsResult<()> {
    let mut df = df.clone();
    CsvWriter::new(writer).include_header(true).finish(&mut df)
}
