//! Table-ready data structures for pivot output.
//!
//! This module provides `PivotTable`, a presentation-ready data structure
//! that can be directly consumed by templates or serialized to JSON.
//!
//! The data flow is:
//! 1. Records (loaded or built in memory)
//! 2. CrossTab (grouped, reduced, totalled)
//! 3. PivotTable (formatted strings for display)
//!
//! PivotTable is a pure presentation layer - it only formats data. All
//! computation happens in the CrossTab.

use serde::{Deserialize, Serialize};

use super::export::quote_field;
use crate::data::value::format_number;
use crate::options::Reducer;
use crate::query::CrossTab;

/// Header of the totals column and label of the totals row.
pub const TOTAL_LABEL: &str = "Total";

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (the row dimension's value, or "Total")
    pub label: String,
    /// One value per column value, then the row total
    pub values: Vec<String>,
}

/// Table-ready cross-tabulation.
///
/// Templates iterate over headers/rows/footer and apply formatting - no
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Optional title (e.g., "Count: Area × Status")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [row dimension label, column values..., Total]
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
    /// Column totals and grand total
    pub footer: TableRow,
}

impl PivotTable {
    /// Create a PivotTable from a CrossTab.
    ///
    /// `row_label` heads the label column; `col_label` only appears in the
    /// title.
    pub fn from_crosstab(tab: &CrossTab, row_label: &str, col_label: &str) -> Self {
        let mut headers = vec![row_label.to_string()];
        headers.extend(tab.col_values.iter().map(|v| v.label()));
        headers.push(TOTAL_LABEL.to_string());

        let rows = tab
            .row_values
            .iter()
            .zip(tab.cells.iter().zip(&tab.row_totals))
            .map(|(value, (cells, total))| TableRow {
                label: value.label(),
                values: format_values(cells, *total),
            })
            .collect();

        let footer = TableRow {
            label: TOTAL_LABEL.to_string(),
            values: format_values(&tab.col_totals, tab.grand_total),
        };

        PivotTable {
            title: Some(format!("{} × {}", row_label, col_label)),
            headers,
            rows,
            footer,
        }
    }

    /// Prefix the title with the reducer's name.
    pub fn with_reducer(mut self, reducer: &Reducer) -> Self {
        self.title = self.title.map(|t| format!("{}: {}", reducer.label(), t));
        self
    }

    /// Render the table itself as CSV: header, data rows, then the totals
    /// row, every field quoted.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(quote_line(self.headers.iter().map(String::as_str)));
        for row in self.rows.iter().chain(std::iter::once(&self.footer)) {
            let fields = std::iter::once(row.label.as_str())
                .chain(row.values.iter().map(String::as_str));
            lines.push(quote_line(fields));
        }
        lines.join("\n")
    }
}

fn quote_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(quote_field).collect::<Vec<_>>().join(",")
}

/// Format cell values followed by their total.
fn format_values(cells: &[f64], total: f64) -> Vec<String> {
    cells
        .iter()
        .chain(std::iter::once(&total))
        .map(|v| format_cell(*v))
        .collect()
}

/// Integers print bare; anything else with two decimals.
fn format_cell(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{:.2}", value)
    }
}
