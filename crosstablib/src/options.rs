//! Options controlling how cells are reduced and how exports pick columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::data::Record;
use crate::error::CrosstabError;

/// Reduction applied to the records falling into one pivot cell.
///
/// Numeric reducers skip values that are not numbers (numeric text counts). An empty subset (or one
/// with no numeric values) reduces to 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "lowercase")]
pub enum Reducer {
    /// Number of records in the cell
    #[default]
    Count,
    /// Sum of a numeric field
    Sum(String),
    /// Mean of a numeric field
    Avg(String),
    /// Smallest value of a numeric field
    Min(String),
    /// Largest value of a numeric field
    Max(String),
    /// Number of distinct non-blank values of a field
    Distinct(String),
}

impl Reducer {
    /// Reduce a cell's records to a single number.
    pub fn apply(&self, subset: &[&Record]) -> f64 {
        match self {
            Reducer::Count => subset.len() as f64,
            Reducer::Sum(field) => numbers(subset, field).sum(),
            Reducer::Avg(field) => {
                let (sum, n) = numbers(subset, field)
                    .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
                if n == 0 {
                    0.0
                } else {
                    sum / n as f64
                }
            }
            Reducer::Min(field) => numbers(subset, field).reduce(f64::min).unwrap_or(0.0),
            Reducer::Max(field) => numbers(subset, field).reduce(f64::max).unwrap_or(0.0),
            Reducer::Distinct(field) => subset
                .iter()
                .map(|r| r.get(field))
                .filter(|v| !v.is_nullish())
                .collect::<BTreeSet<_>>()
                .len() as f64,
        }
    }

    /// Human readable name, used in table titles.
    pub fn label(&self) -> String {
        match self {
            Reducer::Count => "Count".to_string(),
            Reducer::Sum(f) => format!("Sum of {}", f),
            Reducer::Avg(f) => format!("Average of {}", f),
            Reducer::Min(f) => format!("Min of {}", f),
            Reducer::Max(f) => format!("Max of {}", f),
            Reducer::Distinct(f) => format!("Distinct {}", f),
        }
    }
}

fn numbers<'a>(subset: &'a [&'a Record], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    subset.iter().filter_map(move |r| r.get(field).to_number())
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Count => write!(f, "count"),
            Reducer::Sum(field) => write!(f, "sum:{}", field),
            Reducer::Avg(field) => write!(f, "avg:{}", field),
            Reducer::Min(field) => write!(f, "min:{}", field),
            Reducer::Max(field) => write!(f, "max:{}", field),
            Reducer::Distinct(field) => write!(f, "distinct:{}", field),
        }
    }
}

impl FromStr for Reducer {
    type Err = CrosstabError;

    /// Parse `count` or `<op>:<field>` where op is sum, avg, min, max or distinct.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, field) = match s.split_once(':') {
            Some((op, field)) => (op.trim().to_lowercase(), Some(field.trim())),
            None => (s.trim().to_lowercase(), None),
        };

        let field = match field {
            Some("") => {
                return Err(CrosstabError::InvalidReducer(format!(
                    "missing field in '{}'",
                    s
                )))
            }
            Some(f) => f.to_string(),
            None if op == "count" => return Ok(Reducer::Count),
            None => {
                return Err(CrosstabError::InvalidReducer(format!(
                    "'{}' needs a field, e.g. '{}:days'",
                    s, op
                )))
            }
        };

        match op.as_str() {
            "sum" => Ok(Reducer::Sum(field)),
            "avg" | "mean" => Ok(Reducer::Avg(field)),
            "min" => Ok(Reducer::Min(field)),
            "max" => Ok(Reducer::Max(field)),
            "distinct" => Ok(Reducer::Distinct(field)),
            _ => Err(CrosstabError::InvalidReducer(format!("unknown reducer '{}'", s))),
        }
    }
}

/// How the exporter picks its columns from a heterogeneous collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnMode {
    /// Columns come from the first record only; extra fields on later records
    /// are dropped and missing ones export as empty strings.
    #[default]
    FirstRecord,
    /// Columns are the union of all records' fields, in first-seen order.
    Union,
}

impl FromStr for ColumnMode {
    type Err = CrosstabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "first-record" => Ok(ColumnMode::FirstRecord),
            "union" | "all" => Ok(ColumnMode::Union),
            _ => Err(CrosstabError::InvalidOption(format!(
                "unknown column mode '{}' (expected 'first' or 'union')",
                s
            ))),
        }
    }
}
