//! Loading record collections from JSON or CSV.
//!
//! JSON input must be an array of objects. Wrapped payloads (`{"data": [...]}`)
//! are rejected rather than guessed at; unwrap them before loading.
//!
//! CSV input needs a header row. Every field loads as text; short rows simply
//! lack the trailing fields.

use std::fs;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use super::record::Record;
use crate::error::CrosstabError;
use crate::Result;

const LOG_TARGET: &str = "crosstab::loader";

/// Parse records from a JSON string.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(CrosstabError::InvalidRecords(format!(
                "expected an array of objects, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(map) => Ok(Record::from(map)),
            other => Err(CrosstabError::InvalidRecords(format!(
                "element {} is {}, expected an object",
                index,
                json_kind(&other)
            ))),
        })
        .collect()
}

/// Parse CSV records with a header row.
pub fn parse_csv_records(reader: impl Read) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut records: Vec<Record> = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(headers.iter().zip(row.iter()).collect());
    }
    Ok(records)
}

/// Load records from a file; `.csv` files are read as CSV, anything else as
/// JSON.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CrosstabError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let records = if is_csv {
        parse_csv_records(content.as_bytes())?
    } else {
        parse_records(&content)?
    };
    log::debug!(
        target: LOG_TARGET,
        "Loaded {} records from '{}'",
        records.len(),
        path.display()
    );
    Ok(records)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
