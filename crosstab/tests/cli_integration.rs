//! Integration tests for crosstab CLI

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const ATTENDANCE: &str = r#"[
    {"employee": "Ana", "area": "HR", "status": "present", "hours": 8},
    {"employee": "Luis", "area": "HR", "status": "absent", "hours": 0},
    {"employee": "Marta", "area": "IT", "status": "present", "hours": 6}
]"#;

const EMPLOYEES: &str = r#"[
    {"name": "Ana", "email": "ana@example.com", "password": "x1", "roles": ["admin"], "__v": 0},
    {"name": "Luis \"Lucho\"", "email": "luis@example.com", "password": "x2", "roles": [], "__v": 3}
]"#;

fn run_crosstab(args: &[&str]) -> (String, String, bool) {
    let mut cmd_args = vec!["run", "-p", "crosstab", "--"];
    cmd_args.extend(args);

    let output = Command::new("cargo")
        .args(&cmd_args)
        .current_dir(env!("CARGO_MANIFEST_DIR").to_string() + "/..")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

fn fixture(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_crosstab(&["--help"]);

    assert!(success);
    assert!(stdout.contains("crosstab"));
    assert!(stdout.contains("pivot"));
    assert!(stdout.contains("export"));
    assert!(stdout.contains("dimensions"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_crosstab(&["--version"]);

    assert!(success);
    assert!(stdout.contains("crosstab"));
}

#[test]
fn test_pivot_table_output() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&["pivot", &file, "--rows", "area", "--cols", "status"]);

    assert!(success);
    assert!(stdout.contains("Count: area × status"));
    assert!(stdout.contains("absent"));
    assert!(stdout.contains("present"));
    assert!(stdout.contains("Total"));

    let hr = stdout.lines().find(|l| l.starts_with("HR")).unwrap();
    let cells: Vec<&str> = hr.split_whitespace().collect();
    assert_eq!(cells, vec!["HR", "1", "1", "2"]);
}

#[test]
fn test_pivot_json_output() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&[
        "pivot", &file, "--rows", "area", "--cols", "status", "--output", "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["crosstab"]["row_key"], "area");
    assert_eq!(parsed["crosstab"]["grand_total"], 3.0);
    assert!(parsed["table"].get("headers").is_some());
    assert_eq!(parsed["table"]["footer"]["label"], "Total");
}

#[test]
fn test_pivot_csv_output() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) =
        run_crosstab(&["pivot", &file, "-r", "area", "-c", "status", "--csv"]);

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], r#""area","absent","present","Total""#);
    assert_eq!(lines[1], r#""HR","1","1","2""#);
    assert_eq!(lines[2], r#""IT","0","1","1""#);
    assert_eq!(lines[3], r#""Total","1","2","3""#);
}

#[test]
fn test_pivot_sum_with_labels() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&[
        "pivot",
        &file,
        "--value",
        "sum:hours",
        "-d",
        "area=Area",
        "-d",
        "status=Status",
        "--csv",
    ]);

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], r#""Area","absent","present","Total""#);
    assert_eq!(lines[1], r#""HR","0","8","8""#);
    assert_eq!(lines[3], r#""Total","0","14","14""#);
}

#[test]
fn test_pivot_defaults_to_first_two_fields() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&["pivot", &file, "--output", "json"]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["crosstab"]["row_key"], "employee");
    assert_eq!(parsed["crosstab"]["col_key"], "area");
}

#[test]
fn test_pivot_same_axis_fails() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (_, stderr, success) = run_crosstab(&["pivot", &file, "-r", "area", "-c", "area"]);

    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_pivot_unknown_reducer_fails() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (_, stderr, success) = run_crosstab(&["pivot", &file, "--value", "median:hours"]);

    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_pivot_from_csv_input() {
    let dir = TempDir::new().unwrap();
    let file = fixture(
        &dir,
        "attendance.csv",
        "area,status,hours\nHR,present,8\nHR,absent,0\nIT,present,6\n",
    );
    let (stdout, _, success) = run_crosstab(&["pivot", &file, "--value", "avg:hours", "--csv"]);

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], r#""HR","0","8","8""#);
}

#[test]
fn test_nonexistent_file() {
    let (_, stderr, success) = run_crosstab(&["pivot", "/nonexistent/records.json"]);

    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_export_to_file() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "employees.json", EMPLOYEES);
    let out = dir.path().join("employees.csv");
    let out_str = out.to_string_lossy().to_string();

    let (stdout, _, success) = run_crosstab(&["export", &file, "--out", &out_str]);

    assert!(success);
    assert!(stdout.contains("Exported 2 records"));
    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(
        content,
        "name,email\n\"Ana\",\"ana@example.com\"\n\"Luis \"\"Lucho\"\"\",\"luis@example.com\""
    );
}

#[test]
fn test_export_to_stdout_with_exclude() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "employees.json", EMPLOYEES);
    let (stdout, _, success) =
        run_crosstab(&["export", &file, "--out", "-", "--exclude", "e*"]);

    assert!(success);
    assert!(stdout.starts_with("name\n\"Ana\"\n"));
    assert!(!stdout.contains("password"));
    assert!(!stdout.contains("example.com"));
}

#[test]
fn test_export_union_columns() {
    let dir = TempDir::new().unwrap();
    let file = fixture(
        &dir,
        "mixed.json",
        r#"[{"name": "Ana"}, {"name": "Luis", "area": "IT"}]"#,
    );

    let (first, _, success) = run_crosstab(&["export", &file, "--out", "-"]);
    assert!(success);
    assert!(first.starts_with("name\n"));

    let (union, _, success) =
        run_crosstab(&["export", &file, "--out", "-", "--columns", "union"]);
    assert!(success);
    assert!(union.starts_with("name,area\n\"Ana\",\"\"\n\"Luis\",\"IT\""));
}

#[test]
fn test_export_empty_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "empty.json", "[]");
    let out = dir.path().join("empty.csv");
    let out_str = out.to_string_lossy().to_string();

    let (stdout, _, success) = run_crosstab(&["export", &file, "--out", &out_str]);

    assert!(success);
    assert!(stdout.contains("No records to export"));
    assert!(!Path::new(&out).exists());
}

#[test]
fn test_dimensions_output() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&[
        "dimensions",
        &file,
        "-d",
        "area=Area",
        "-d",
        "status=Status",
        "-d",
        "employee",
    ]);

    assert!(success);
    assert!(stdout.contains("Rows:    area (Area)"));
    assert!(stdout.contains("Columns: status (Status)"));
    assert!(stdout.contains("  employee"));
}

#[test]
fn test_dimensions_json_output() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (stdout, _, success) = run_crosstab(&[
        "dimensions", &file, "--rows", "status", "--cols", "area", "--output", "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["row"]["key"], "status");
    assert_eq!(parsed["col"]["key"], "area");
    let row_options: Vec<&str> = parsed["row_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["key"].as_str().unwrap())
        .collect();
    assert!(!row_options.contains(&"area"));
}

#[test]
fn test_verbose_logging() {
    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "attendance.json", ATTENDANCE);
    let (_, stderr, success) = run_crosstab(&["-v", "pivot", &file]);

    assert!(success);
    assert!(stderr.contains("Read 3 records"));
}
