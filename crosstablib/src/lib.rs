//! # crosstablib
//!
//! Cross-tabulation and CSV export over flat record collections.
//!
//! ## Overview
//!
//! The list screens of the HR portal (employees, contracts, attendance,
//! leave requests, inductions) all hold a collection of flat records already
//! fetched from the backend. This library is the shared core behind their
//! pivot views and CSV downloads:
//!
//! - **Aggregator**: groups records by a row key and a column key and reduces
//!   each cell (a count by default), with row, column and grand totals
//! - **Dimension Selector**: holds the current row/column axes and never lets
//!   them coincide
//! - **Exporter**: serializes records to quote-every-field CSV, always dropping
//!   credentials and internal fields, and hands the file to a sink
//!
//! The pipeline has three stages, each with its own module:
//!
//! 1. [`data`]: `Record`, `Value`, loaders
//! 2. [`query`]: `CrossTab`, `DimensionSelector`
//! 3. [`output`]: `PivotTable`, CSV export
//!
//! Nothing here does network I/O or keeps state between calls; every result
//! is recomputed from its inputs.
//!
//! ## Example
//!
//! ```rust
//! use crosstablib::{
//!     aggregate, to_csv, Dimension, DimensionSelector, DimensionSet, ExportOptions, Record,
//! };
//!
//! let records = vec![
//!     Record::new().with("area", "HR").with("status", "present"),
//!     Record::new().with("area", "HR").with("status", "absent"),
//!     Record::new().with("area", "IT").with("status", "present"),
//! ];
//!
//! // Pivot directly
//! let tab = aggregate(&records, "area", "status");
//! assert_eq!(tab.cell("IT", "absent"), Some(0.0));
//! assert_eq!(tab.row_total("HR"), Some(2.0));
//! assert_eq!(tab.grand_total, 3.0);
//!
//! // Pivot through a selector
//! let dimensions = DimensionSet::new([
//!     Dimension::new("area", "Area"),
//!     Dimension::new("status", "Status"),
//! ])
//! .unwrap();
//! let mut selector = DimensionSelector::new(dimensions, "area", "status").unwrap();
//! selector.swap();
//! assert_eq!(selector.crosstab(&records).row_key, "status");
//!
//! // Export
//! let csv = to_csv(&records, &ExportOptions::new()).unwrap();
//! assert!(csv.starts_with("area,status\n\"HR\",\"present\""));
//! ```

pub mod data;
pub mod error;
pub mod options;
pub mod output;
pub mod query;

pub use data::{load_records, parse_csv_records, parse_records, Record, Tabular, Value};
pub use error::CrosstabError;
pub use options::{ColumnMode, Reducer};
pub use output::{
    download, export_csv, export_rows, to_csv, ArtifactSink, CsvArtifact, DirectorySink,
    ExportOptions, PivotTable, TableRow, WriterSink, DEFAULT_EXCLUDED_FIELDS,
};
pub use query::{
    aggregate, aggregate_by, aggregate_rows, aggregate_with, CrossTab, Dimension,
    DimensionSelector, DimensionSet,
};

/// Result type for crosstablib operations
pub type Result<T> = std::result::Result<T, CrosstabError>;
