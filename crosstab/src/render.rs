//! Template contexts for CLI output.
//!
//! Everything here is pre-formatted (padded, truncated) so the outstanding
//! templates only iterate and print.

use crosstablib::{DimensionSelector, PivotTable, TableRow};
use serde::Serialize;

/// Widest the label column gets before names are truncated
const MAX_NAME_WIDTH: usize = 40;
/// Narrowest a value column gets
const MIN_CELL_WIDTH: usize = 8;

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
struct TemplateRow {
    /// Pre-padded label (left-aligned, padded to name_width)
    name: String,
    /// Pre-padded cells (right-aligned, padded to cell_width)
    cells: Vec<String>,
}

/// Data context for the pivot table template
#[derive(Debug, Serialize)]
pub struct PivotTableContext {
    title: Option<String>,
    /// Pre-padded label column header
    name_header: String,
    /// Pre-padded value column headers
    columns: Vec<String>,
    /// Separator line (dashes)
    separator: String,
    rows: Vec<TemplateRow>,
    total: TemplateRow,
}

#[derive(Debug, Serialize)]
pub struct DimensionsContext {
    row: String,
    col: String,
    row_options: Vec<String>,
    col_options: Vec<String>,
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

fn to_template_row(row: &TableRow, name_width: usize, cell_width: usize) -> TemplateRow {
    let truncated = truncate_name(&row.label, name_width - 2);
    TemplateRow {
        name: format!("{:<width$}", truncated, width = name_width),
        cells: row
            .values
            .iter()
            .map(|v| format!("{:>width$}", v, width = cell_width))
            .collect(),
    }
}

/// Lay out a pivot table for the text template
pub fn pivot_context(table: &PivotTable) -> PivotTableContext {
    let (name_header, column_headers) = match table.headers.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", &[][..]),
    };

    let name_width = table
        .rows
        .iter()
        .chain(std::iter::once(&table.footer))
        .map(|r| r.label.chars().count())
        .chain(std::iter::once(name_header.chars().count()))
        .max()
        .unwrap_or(0)
        .saturating_add(2)
        .clamp(8, MAX_NAME_WIDTH);

    let cell_width = column_headers
        .iter()
        .chain(table.rows.iter().chain(std::iter::once(&table.footer)).flat_map(|r| &r.values))
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_CELL_WIDTH);

    let columns: Vec<String> = column_headers
        .iter()
        .map(|h| format!("{:>width$}", h, width = cell_width))
        .collect();
    let separator = "-".repeat(name_width + (cell_width + 1) * columns.len());

    PivotTableContext {
        title: table.title.clone(),
        name_header: format!(
            "{:<width$}",
            truncate_name(name_header, name_width - 2),
            width = name_width
        ),
        columns,
        separator,
        rows: table
            .rows
            .iter()
            .map(|r| to_template_row(r, name_width, cell_width))
            .collect(),
        total: to_template_row(&table.footer, name_width, cell_width),
    }
}

/// Describe the current axes and the options each axis offers
pub fn dimensions_context(selector: &DimensionSelector) -> DimensionsContext {
    let describe = |key: &str, label: &str| {
        if key == label {
            key.to_string()
        } else {
            format!("{key} ({label})")
        }
    };
    DimensionsContext {
        row: describe(&selector.row().key, &selector.row().label),
        col: describe(&selector.col().key, &selector.col().label),
        row_options: selector
            .row_options()
            .iter()
            .map(|d| describe(&d.key, &d.label))
            .collect(),
        col_options: selector
            .col_options()
            .iter()
            .map(|d| describe(&d.key, &d.label))
            .collect(),
    }
}
