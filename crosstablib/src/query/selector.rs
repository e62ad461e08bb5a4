//! Dimensions and the row/column axis selector.
//!
//! The selector holds the current row and column keys. Each axis is offered
//! every dimension except the one currently chosen for the other axis, so the
//! two keys never coincide and the aggregator never sees equal axes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::crosstab::{aggregate_by, CrossTab};
use crate::data::Record;
use crate::error::CrosstabError;
use crate::options::Reducer;
use crate::output::PivotTable;
use crate::Result;

/// A field usable as a pivot axis, with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub key: String,
    pub label: String,
}

impl Dimension {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

impl FromStr for Dimension {
    type Err = CrosstabError;

    /// Parse `key=Label`, or a bare `key` labelled with itself.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (key, label) = match s.split_once('=') {
            Some((key, label)) => (key.trim(), label.trim()),
            None => (s.trim(), s.trim()),
        };
        if key.is_empty() {
            return Err(CrosstabError::InvalidOption(format!(
                "empty dimension key in '{}'",
                s
            )));
        }
        Ok(Dimension::new(key, label))
    }
}

/// Dimensions with unique keys, in the order supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DimensionSet {
    dimensions: Vec<Dimension>,
}

impl DimensionSet {
    /// Build a set, rejecting duplicate keys.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Result<Self> {
        let mut set = DimensionSet::default();
        for dimension in dimensions {
            if set.get(&dimension.key).is_some() {
                return Err(CrosstabError::DuplicateDimension(dimension.key));
            }
            set.dimensions.push(dimension);
        }
        Ok(set)
    }

    /// Dimensions for every field of the first record, labelled by key.
    pub fn infer(records: &[Record]) -> Self {
        let dimensions = records
            .first()
            .map(|r| r.keys().map(|k| Dimension::new(k, k)).collect())
            .unwrap_or_default();
        DimensionSet { dimensions }
    }

    pub fn get(&self, key: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    fn require(&self, key: &str) -> Result<&Dimension> {
        self.get(key)
            .ok_or_else(|| CrosstabError::UnknownDimension(key.to_string()))
    }
}

/// Current choice of row and column dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionSelector {
    dimensions: DimensionSet,
    default_row: String,
    default_col: String,
    row: String,
    col: String,
}

impl DimensionSelector {
    /// Create a selector starting at the given default axes.
    ///
    /// Both defaults must be known dimensions and must differ.
    pub fn new(dimensions: DimensionSet, default_row: &str, default_col: &str) -> Result<Self> {
        dimensions.require(default_row)?;
        dimensions.require(default_col)?;
        if default_row == default_col {
            return Err(CrosstabError::SameAxis(default_row.to_string()));
        }
        Ok(Self {
            dimensions,
            default_row: default_row.to_string(),
            default_col: default_col.to_string(),
            row: default_row.to_string(),
            col: default_col.to_string(),
        })
    }

    /// Current row dimension
    pub fn row(&self) -> &Dimension {
        self.dimension(&self.row)
    }

    /// Current column dimension
    pub fn col(&self) -> &Dimension {
        self.dimension(&self.col)
    }

    /// All configured dimensions
    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    /// Dimensions selectable for rows: everything but the current column.
    pub fn row_options(&self) -> Vec<&Dimension> {
        self.dimensions.iter().filter(|d| d.key != self.col).collect()
    }

    /// Dimensions selectable for columns: everything but the current row.
    pub fn col_options(&self) -> Vec<&Dimension> {
        self.dimensions.iter().filter(|d| d.key != self.row).collect()
    }

    /// Choose the row dimension. Leaves the selection unchanged on error.
    pub fn select_row(&mut self, key: &str) -> Result<()> {
        self.dimensions.require(key)?;
        if key == self.col {
            return Err(CrosstabError::SameAxis(key.to_string()));
        }
        self.row = key.to_string();
        Ok(())
    }

    /// Choose the column dimension. Leaves the selection unchanged on error.
    pub fn select_col(&mut self, key: &str) -> Result<()> {
        self.dimensions.require(key)?;
        if key == self.row {
            return Err(CrosstabError::SameAxis(key.to_string()));
        }
        self.col = key.to_string();
        Ok(())
    }

    /// Exchange the row and column dimensions.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.row, &mut self.col);
    }

    /// Go back to the default axes.
    pub fn reset(&mut self) {
        self.row = self.default_row.clone();
        self.col = self.default_col.clone();
    }

    /// Count records over the current axes.
    pub fn crosstab(&self, records: &[Record]) -> CrossTab {
        self.crosstab_with(records, &Reducer::Count)
    }

    /// Cross-tabulate records over the current axes with a reducer.
    pub fn crosstab_with(&self, records: &[Record], reducer: &Reducer) -> CrossTab {
        aggregate_by(records, &self.row, &self.col, reducer)
    }

    /// Presentation table over the current axes, labelled with the
    /// dimension labels.
    pub fn table(&self, records: &[Record], reducer: &Reducer) -> PivotTable {
        let tab = self.crosstab_with(records, reducer);
        PivotTable::from_crosstab(&tab, &self.row().label, &self.col().label)
            .with_reducer(reducer)
    }

    // Keys are validated on every write, so the lookup cannot miss.
    fn dimension(&self, key: &str) -> &Dimension {
        self.dimensions
            .get(key)
            .unwrap_or(&self.dimensions.dimensions[0])
    }
}
