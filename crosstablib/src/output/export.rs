//! CSV export of record collections.
//!
//! Every data field is wrapped in double quotes with inner quotes doubled;
//! the header line is the bare column names joined by commas. Lines are
//! joined with `\n` and the last line has no terminator.
//!
//! Sensitive and internal fields (`DEFAULT_EXCLUDED_FIELDS`) are always
//! dropped. Callers can exclude more fields, by name or glob pattern, and can
//! restrict the projection with include patterns.
//!
//! An empty collection produces no artifact at all.

use glob::Pattern;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data::{Record, Tabular};
use crate::error::CrosstabError;
use crate::options::ColumnMode;
use crate::Result;

const LOG_TARGET: &str = "crosstab::export";

/// Fields never written to an export.
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 5] =
    ["password", "resetCode", "resetCodeExpire", "roles", "__v"];

/// MIME type attached to exported artifacts.
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

/// Field selection and column layout for an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Extra fields to drop, on top of the defaults
    pub exclude: Vec<Pattern>,
    /// If non-empty, only fields matching one of these are kept
    pub include: Vec<Pattern>,
    /// How columns are chosen when records differ in shape
    pub columns: ColumnMode,
}

impl ExportOptions {
    /// Options with only the default exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exclusion (a field name or glob pattern).
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an inclusion (a field name or glob pattern).
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple exclusions.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Add multiple inclusions.
    pub fn include_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern)?;
        }
        Ok(self)
    }

    /// Set the column mode.
    pub fn columns(mut self, mode: ColumnMode) -> Self {
        self.columns = mode;
        self
    }

    /// Whether a field survives the filter.
    ///
    /// Default exclusions win over everything, then caller exclusions, then
    /// the include list (if any).
    pub fn keeps(&self, field: &str) -> bool {
        if DEFAULT_EXCLUDED_FIELDS.contains(&field) || matches_any(&self.exclude, field) {
            return false;
        }
        self.include.is_empty() || matches_any(&self.include, field)
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| CrosstabError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

// Exact comparison first so names containing glob metacharacters still match.
fn matches_any(patterns: &[Pattern], field: &str) -> bool {
    patterns
        .iter()
        .any(|p| p.as_str() == field || p.matches(field))
}

/// A CSV export ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvArtifact {
    /// File name to save under, as given by the caller
    pub filename: String,
    /// Always `CSV_MIME_TYPE`
    pub mime_type: String,
    /// CSV text
    pub content: String,
}

/// Quote a field unconditionally, doubling inner quotes.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Serialize records to CSV text. Returns `None` for an empty collection.
pub fn to_csv(records: &[Record], options: &ExportOptions) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let filtered: Vec<Record> = records
        .iter()
        .map(|r| r.retain_fields(|k| options.keeps(k)))
        .collect();
    let columns = select_columns(&filtered, options.columns);

    let mut lines = Vec::with_capacity(filtered.len() + 1);
    lines.push(columns.join(","));
    for record in &filtered {
        let fields: Vec<String> = columns
            .iter()
            .map(|c| quote_field(&record.get(c).to_string()))
            .collect();
        lines.push(fields.join(","));
    }

    Some(lines.join("\n"))
}

fn select_columns(records: &[Record], mode: ColumnMode) -> Vec<String> {
    match mode {
        ColumnMode::FirstRecord => records
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default(),
        ColumnMode::Union => {
            let mut columns: Vec<String> = Vec::new();
            for key in records.iter().flat_map(Record::keys) {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
            columns
        }
    }
}

/// Build a CSV artifact named `filename`. Returns `None` for an empty
/// collection.
pub fn export_csv(
    filename: &str,
    records: &[Record],
    options: &ExportOptions,
) -> Option<CsvArtifact> {
    let Some(content) = to_csv(records, options) else {
        log::debug!(target: LOG_TARGET, "Nothing to export for '{}'", filename);
        return None;
    };
    log::debug!(
        target: LOG_TARGET,
        "Exported {} records to '{}' ({} bytes)",
        records.len(),
        filename,
        content.len()
    );
    Some(CsvArtifact {
        filename: filename.to_string(),
        mime_type: CSV_MIME_TYPE.to_string(),
        content,
    })
}

/// Export typed entities through their record projection.
pub fn export_rows<T: Tabular>(
    filename: &str,
    items: &[T],
    options: &ExportOptions,
) -> Option<CsvArtifact> {
    let records: Vec<Record> = items.iter().map(Tabular::to_record).collect();
    export_csv(filename, &records, options)
}

/// Where finished artifacts are saved.
pub trait ArtifactSink {
    fn deliver(&mut self, artifact: &CsvArtifact) -> Result<()>;
}

/// Saves artifacts as files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path an artifact will be written to.
    pub fn path_for(&self, artifact: &CsvArtifact) -> PathBuf {
        self.dir.join(&artifact.filename)
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: &CsvArtifact) -> Result<()> {
        let path = self.path_for(artifact);
        fs::write(&path, &artifact.content)?;
        log::info!(target: LOG_TARGET, "Saved '{}'", path.display());
        Ok(())
    }
}

/// Writes artifact content to any writer (stdout, a buffer, ...).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ArtifactSink for WriterSink<W> {
    fn deliver(&mut self, artifact: &CsvArtifact) -> Result<()> {
        self.writer.write_all(artifact.content.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Export records and hand the artifact to `sink`.
///
/// Returns whether anything was delivered; an empty collection never reaches
/// the sink.
pub fn download(
    filename: &str,
    records: &[Record],
    options: &ExportOptions,
    sink: &mut dyn ArtifactSink,
) -> Result<bool> {
    match export_csv(filename, records, options) {
        Some(artifact) => {
            sink.deliver(&artifact)?;
            Ok(true)
        }
        None => {
            log::info!(target: LOG_TARGET, "No records, skipped '{}'", filename);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Vec<CsvArtifact>,
    }

    impl ArtifactSink for RecordingSink {
        fn deliver(&mut self, artifact: &CsvArtifact) -> Result<()> {
            self.delivered.push(artifact.clone());
            Ok(())
        }
    }

    fn employees() -> Vec<Record> {
        vec![
            Record::new()
                .with("name", "Ana")
                .with("area", "HR")
                .with("password", "hunter2")
                .with("__v", 0),
            Record::new()
                .with("name", "Luis")
                .with("area", "IT")
                .with("password", "secret")
                .with("__v", 3),
        ]
    }

    fn parse(csv: &str) -> Vec<Vec<String>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv.as_bytes());
        rdr.records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_basic_export() {
        let csv = to_csv(&employees(), &ExportOptions::new()).unwrap();
        assert_eq!(csv, "name,area\n\"Ana\",\"HR\"\n\"Luis\",\"IT\"");
    }

    #[test]
    fn test_empty_collection_produces_nothing() {
        assert!(to_csv(&[], &ExportOptions::new()).is_none());
        assert!(export_csv("empty.csv", &[], &ExportOptions::new()).is_none());

        let mut sink = RecordingSink::default();
        let delivered = download("empty.csv", &[], &ExportOptions::new(), &mut sink).unwrap();
        assert!(!delivered);
        assert!(sink.delivered.is_empty());
    }

    #[test]
    fn test_default_exclusions_always_apply() {
        let options = ExportOptions::new().exclude("area").unwrap();
        let csv = to_csv(&employees(), &options).unwrap();
        assert!(!csv.contains("password"));
        assert!(!csv.contains("hunter2"));
        assert!(!csv.contains("__v"));
        assert_eq!(csv.lines().next(), Some("name"));

        // Including a sensitive field explicitly does not bring it back.
        let options = ExportOptions::new().include("password").unwrap();
        let csv = to_csv(&employees(), &options).unwrap();
        assert!(!csv.contains("hunter2"));
    }

    #[test]
    fn test_all_defaults_excluded() {
        let record = DEFAULT_EXCLUDED_FIELDS
            .iter()
            .fold(Record::new().with("id", 1), |r, k| r.with(*k, "x"));
        let csv = to_csv(&[record], &ExportOptions::new()).unwrap();
        assert_eq!(csv, "id\n\"1\"");
    }

    #[test]
    fn test_glob_exclusion() {
        let records = vec![Record::new()
            .with("name", "Ana")
            .with("internalId", 7)
            .with("internalNote", "x")];
        let options = ExportOptions::new().exclude("internal*").unwrap();
        assert_eq!(to_csv(&records, &options).unwrap(), "name\n\"Ana\"");
    }

    #[test]
    fn test_include_restricts_projection() {
        let options = ExportOptions::new().include_many(&["area"]).unwrap();
        let csv = to_csv(&employees(), &options).unwrap();
        assert_eq!(csv, "area\n\"HR\"\n\"IT\"");
    }

    #[test]
    fn test_invalid_glob() {
        let err = ExportOptions::new().exclude("[").unwrap_err();
        assert!(matches!(err, CrosstabError::InvalidGlob { .. }));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let records = vec![Record::new().with("note", r#"He said "hi""#)];
        let csv = to_csv(&records, &ExportOptions::new()).unwrap();
        assert_eq!(csv, "note\n\"He said \"\"hi\"\"\"");

        let parsed = parse(&csv);
        assert_eq!(parsed[1][0], r#"He said "hi""#);
    }

    #[test]
    fn test_commas_and_newlines_survive_reparse() {
        let records = vec![Record::new()
            .with("name", "Díaz, Luis")
            .with("address", "Line 1\nLine 2")];
        let csv = to_csv(&records, &ExportOptions::new()).unwrap();
        let parsed = parse(&csv);
        assert_eq!(parsed[1], vec!["Díaz, Luis", "Line 1\nLine 2"]);
    }

    #[test]
    fn test_plain_values_round_trip() {
        let records = vec![
            Record::new().with("name", "Ana").with("days", 3).with("active", true),
            Record::new().with("name", "Luis").with("days", 12).with("active", false),
        ];
        let csv = to_csv(&records, &ExportOptions::new()).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], "name,days,active");

        for (line, record) in lines[1..].iter().zip(&records) {
            let fields: Vec<&str> = line.split(',').map(|f| f.trim_matches('"')).collect();
            let expected: Vec<String> = record.iter().map(|(_, v)| v.to_string()).collect();
            assert_eq!(fields, expected);
        }
    }

    #[test]
    fn test_null_and_missing_are_empty() {
        let records = vec![
            Record::new().with("name", "Ana").with("area", Value::Null),
            Record::new().with("name", "Luis"),
        ];
        let csv = to_csv(&records, &ExportOptions::new()).unwrap();
        assert_eq!(csv, "name,area\n\"Ana\",\"\"\n\"Luis\",\"\"");
    }

    #[test]
    fn test_first_record_columns_truncate() {
        let records = vec![
            Record::new().with("name", "Ana"),
            Record::new().with("name", "Luis").with("area", "IT"),
        ];
        let csv = to_csv(&records, &ExportOptions::new()).unwrap();
        assert_eq!(csv, "name\n\"Ana\"\n\"Luis\"");
    }

    #[test]
    fn test_union_columns() {
        let records = vec![
            Record::new().with("name", "Ana"),
            Record::new().with("area", "IT").with("name", "Luis"),
        ];
        let options = ExportOptions::new().columns(ColumnMode::Union);
        let csv = to_csv(&records, &options).unwrap();
        assert_eq!(csv, "name,area\n\"Ana\",\"\"\n\"Luis\",\"IT\"");
    }

    #[test]
    fn test_every_line_matches_header_width() {
        let records = vec![
            Record::new().with("a", 1).with("b", 2).with("c", 3),
            Record::new().with("a", 1),
            Record::new().with("c", 3).with("d", 4),
        ];
        for mode in [ColumnMode::FirstRecord, ColumnMode::Union] {
            let csv = to_csv(&records, &ExportOptions::new().columns(mode)).unwrap();
            let parsed = parse(&csv);
            let width = parsed[0].len();
            assert!(parsed.iter().all(|row| row.len() == width));
        }
    }

    #[test]
    fn test_deterministic_output() {
        let a = to_csv(&employees(), &ExportOptions::new());
        let b = to_csv(&employees(), &ExportOptions::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_artifact_metadata() {
        let artifact = export_csv("empleados.csv", &employees(), &ExportOptions::new()).unwrap();
        assert_eq!(artifact.filename, "empleados.csv");
        assert_eq!(artifact.mime_type, "text/csv;charset=utf-8;");
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let delivered =
            download("empleados.csv", &employees(), &ExportOptions::new(), &mut sink).unwrap();
        assert!(delivered);

        let written = fs::read_to_string(dir.path().join("empleados.csv")).unwrap();
        assert!(written.starts_with("name,area\n"));
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        download("x.csv", &employees(), &ExportOptions::new(), &mut sink).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "name,area\n\"Ana\",\"HR\"\n\"Luis\",\"IT\"\n");
    }

    struct Contract {
        employee: &'static str,
        kind: &'static str,
    }

    impl Tabular for Contract {
        fn to_record(&self) -> Record {
            Record::new()
                .with("employee", self.employee)
                .with("kind", self.kind)
        }
    }

    #[test]
    fn test_export_typed_rows() {
        let contracts = [Contract {
            employee: "Ana",
            kind: "indefinido",
        }];
        let artifact = export_rows("contratos.csv", &contracts, &ExportOptions::new()).unwrap();
        assert_eq!(artifact.content, "employee,kind\n\"Ana\",\"indefinido\"");
    }
}
