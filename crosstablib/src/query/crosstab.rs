//! Cross-tabulation of a record collection over two dimension keys.
//!
//! The row and column axes are the distinct values each key takes across the
//! collection, sorted ascending. Records lacking a key fall into the
//! `Value::Undefined` bucket, which sorts last. Every (row, column) pair gets
//! a cell, even when no record matches it.
//!
//! The aggregator does not check that the row and column keys differ; that is
//! the selector's job.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::{Record, Tabular, Value};
use crate::options::Reducer;

const LOG_TARGET: &str = "crosstab::aggregate";

/// A computed cross-tabulation with row, column and grand totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    /// Field grouped along rows
    pub row_key: String,
    /// Field grouped along columns
    pub col_key: String,
    /// Distinct row values, ascending
    pub row_values: Vec<Value>,
    /// Distinct column values, ascending
    pub col_values: Vec<Value>,
    /// `cells[row][col]`, one entry per pair of axis values
    pub cells: Vec<Vec<f64>>,
    /// Sum of each row's cells
    pub row_totals: Vec<f64>,
    /// Sum of each column's cells
    pub col_totals: Vec<f64>,
    /// Sum of all row totals
    pub grand_total: f64,
}

impl CrossTab {
    /// True when the input collection was empty.
    pub fn is_empty(&self) -> bool {
        self.row_values.is_empty() && self.col_values.is_empty()
    }

    /// Cell value for a (row value, column value) pair, if both values occur.
    pub fn cell(&self, row: impl Into<Value>, col: impl Into<Value>) -> Option<f64> {
        let r = self.row_index(&row.into())?;
        let c = self.col_index(&col.into())?;
        Some(self.cells[r][c])
    }

    /// Total of the row for `row`, if it occurs.
    pub fn row_total(&self, row: impl Into<Value>) -> Option<f64> {
        self.row_index(&row.into()).map(|r| self.row_totals[r])
    }

    /// Total of the column for `col`, if it occurs.
    pub fn col_total(&self, col: impl Into<Value>) -> Option<f64> {
        self.col_index(&col.into()).map(|c| self.col_totals[c])
    }

    fn row_index(&self, value: &Value) -> Option<usize> {
        self.row_values.binary_search(value).ok()
    }

    fn col_index(&self, value: &Value) -> Option<usize> {
        self.col_values.binary_search(value).ok()
    }
}

/// Count records per (row value, column value) pair.
pub fn aggregate(records: &[Record], row_key: &str, col_key: &str) -> CrossTab {
    aggregate_with(records, row_key, col_key, |subset| subset.len() as f64)
}

/// Cross-tabulate with a named reducer.
pub fn aggregate_by(
    records: &[Record],
    row_key: &str,
    col_key: &str,
    reducer: &Reducer,
) -> CrossTab {
    aggregate_with(records, row_key, col_key, |subset| reducer.apply(subset))
}

/// Cross-tabulate typed entities through their record projection.
pub fn aggregate_rows<T: Tabular>(
    items: &[T],
    row_key: &str,
    col_key: &str,
    reducer: &Reducer,
) -> CrossTab {
    let records: Vec<Record> = items.iter().map(Tabular::to_record).collect();
    aggregate_by(&records, row_key, col_key, reducer)
}

/// Cross-tabulate with a custom reducer over each cell's records.
///
/// The reducer is called once per cell, with an empty slice for cells no
/// record falls into.
pub fn aggregate_with<F>(records: &[Record], row_key: &str, col_key: &str, reducer: F) -> CrossTab
where
    F: Fn(&[&Record]) -> f64,
{
    // Single pass grouping; equivalent to filtering the collection per cell.
    let mut groups: BTreeMap<(&Value, &Value), Vec<&Record>> = BTreeMap::new();
    let mut rows: BTreeSet<&Value> = BTreeSet::new();
    let mut cols: BTreeSet<&Value> = BTreeSet::new();

    for record in records {
        let r = record.get(row_key);
        let c = record.get(col_key);
        rows.insert(r);
        cols.insert(c);
        groups.entry((r, c)).or_default().push(record);
    }

    let cells: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            cols.iter()
                .map(|c| {
                    let subset = groups.get(&(*r, *c)).map(Vec::as_slice).unwrap_or(&[]);
                    reducer(subset)
                })
                .collect()
        })
        .collect();

    let row_totals: Vec<f64> = cells.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols.len())
        .map(|c| cells.iter().map(|row| row[c]).sum())
        .collect();
    let grand_total = row_totals.iter().sum();

    log::debug!(
        target: LOG_TARGET,
        "Cross-tabulated {} records on '{}' x '{}': {} rows, {} columns",
        records.len(),
        row_key,
        col_key,
        rows.len(),
        cols.len()
    );

    CrossTab {
        row_key: row_key.to_string(),
        col_key: col_key.to_string(),
        row_values: rows.into_iter().cloned().collect(),
        col_values: cols.into_iter().cloned().collect(),
        cells,
        row_totals,
        col_totals,
        grand_total,
    }
}
