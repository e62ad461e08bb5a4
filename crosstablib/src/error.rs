//! Error types for crosstablib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, pivoting, or exporting records.
///
/// The aggregator and exporter never fail on record shape; these cover
/// configuration mistakes and I/O at the edges.
#[derive(Error, Debug)]
pub enum CrosstabError {
    /// Failed to read a records file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Records input is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON was valid but not an array of objects
    #[error("invalid records: {0}")]
    InvalidRecords(String),

    /// Invalid glob pattern in a field filter
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Two dimensions share the same key
    #[error("duplicate dimension key: {0}")]
    DuplicateDimension(String),

    /// Key is not one of the configured dimensions
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Row and column axes would use the same key
    #[error("row and column dimensions must differ (both are '{0}')")]
    SameAxis(String),

    /// Reducer expression could not be parsed
    #[error("invalid reducer: {0}")]
    InvalidReducer(String),

    /// Option value could not be parsed
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
