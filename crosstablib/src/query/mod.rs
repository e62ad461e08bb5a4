//! Query processing: group records and choose pivot axes.
//!
//! This module handles the second stage of the pipeline - turning a record
//! collection into a cross-tabulation. It provides:
//!
//! - **Aggregation**: `aggregate` and friends, producing a `CrossTab`
//! - **Dimensions**: `Dimension`, `DimensionSet`, and the `DimensionSelector`
//!   that keeps the row and column axes distinct
//!
//! ## Example
//!
//! ```rust
//! use crosstablib::data::Record;
//! use crosstablib::query::aggregate;
//!
//! let records = vec![
//!     Record::new().with("area", "HR").with("status", "present"),
//!     Record::new().with("area", "IT").with("status", "absent"),
//! ];
//! let tab = aggregate(&records, "area", "status");
//! assert_eq!(tab.cell("HR", "present"), Some(1.0));
//! assert_eq!(tab.grand_total, 2.0);
//! ```

pub mod crosstab;
pub mod selector;

pub use crosstab::{aggregate, aggregate_by, aggregate_rows, aggregate_with, CrossTab};
pub use selector::{Dimension, DimensionSelector, DimensionSet};
