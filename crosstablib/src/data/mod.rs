//! Data: records and the values they hold.
//!
//! This module is the first stage of the pipeline. It provides:
//!
//! - **Value**: a primitive field value with a total order for pivot axes
//! - **Record**: an ordered field map, deserializable from JSON objects
//! - **Tabular**: projection of typed entities into records
//! - **Loading**: `load_records` / `parse_records` for JSON arrays
//!
//! ## Example
//!
//! ```rust
//! use crosstablib::data::{parse_records, Value};
//!
//! let records = parse_records(r#"[{"area": "HR"}, {"area": "IT"}]"#).unwrap();
//! assert_eq!(records[1].get("area"), &Value::from("IT"));
//! ```

pub mod loader;
pub mod record;
pub mod value;

pub use loader::{load_records, parse_csv_records, parse_records};
pub use record::{Record, Tabular};
pub use value::{Value, BLANK_LABEL};
