//! Output: present cross-tabulations and export records.
//!
//! This module handles the final stage of the pipeline. It provides:
//!
//! - **PivotTable**: Table-ready data structure with headers, rows, and footer
//! - **Export**: quote-every-field CSV serialization of records, delivered
//!   through an `ArtifactSink`
//!
//! PivotTable is a pure presentation layer - it only formats data into strings.
//! All grouping and reduction happens in the query stage.
//!
//! ## Example
//!
//! ```rust
//! use crosstablib::data::Record;
//! use crosstablib::output::{to_csv, ExportOptions};
//!
//! let records = vec![Record::new().with("name", "Ana").with("password", "x")];
//! let csv = to_csv(&records, &ExportOptions::new()).unwrap();
//! assert_eq!(csv, "name\n\"Ana\"");
//! ```

pub mod export;
pub mod table;

pub use export::{
    download, export_csv, export_rows, quote_field, to_csv, ArtifactSink, CsvArtifact,
    DirectorySink, ExportOptions, WriterSink, CSV_MIME_TYPE, DEFAULT_EXCLUDED_FIELDS,
};
pub use table::{PivotTable, TableRow, TOTAL_LABEL};
