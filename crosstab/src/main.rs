//! # crosstab
//!
//! A CLI for pivoting and exporting flat record collections.
//!
//! ## Overview
//!
//! crosstab is built on top of crosstablib and exposes its three building
//! blocks on the command line: cross-tabulating records by two fields,
//! inspecting which fields can serve as pivot axes, and exporting records to
//! CSV with sensitive fields stripped.
//!
//! Records are read from a JSON file holding an array of objects, a CSV file
//! with a header row, or `-` for a JSON array on stdin.
//!
//! ## Usage
//!
//! ```bash
//! # Count attendance by area and status
//! crosstab pivot attendance.json --rows area --cols status
//!
//! # Sum leave days instead of counting, with readable axis names
//! crosstab pivot leaves.json -r area -c type --value sum:days \
//!     -d area=Area -d type="Leave type"
//!
//! # Emit the pivot as CSV or JSON
//! crosstab pivot attendance.json --csv
//! crosstab pivot attendance.json --output json
//!
//! # Export records to CSV, dropping extra fields
//! crosstab export employees.json --out employees.csv --exclude "internal*"
//!
//! # Export every field seen in any record to stdout
//! crosstab export employees.json --out - --columns union
//!
//! # Show the pivot axes available for a file
//! crosstab dimensions attendance.json
//! ```

mod render;

use std::path::Path;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use crosstablib::{
    download, load_records, parse_records, ColumnMode, Dimension, DimensionSelector,
    DimensionSet, DirectorySink, ExportOptions, Record, Reducer, WriterSink,
};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use outstanding::Theme;
use serde_json::json;

/// Include templates at compile time
const PIVOT_TABLE_TEMPLATE: &str = include_str!("../templates/pivot_table.jinja");
const DIMENSIONS_TEMPLATE: &str = include_str!("../templates/dimensions.jinja");
const EXPORT_TEMPLATE: &str = include_str!("../templates/export.jinja");

const LOG_TARGET: &str = "crosstab::cli";

/// Arguments shared by every command that reads a record file and pivots it
fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .help("Records to read: a JSON array, a CSV file, or '-' for JSON on stdin")
}

fn axis_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("rows")
            .short('r')
            .long("rows")
            .help("Field to group rows by (defaults to the first dimension)"),
    )
    .arg(
        Arg::new("cols")
            .short('c')
            .long("cols")
            .help("Field to group columns by (defaults to the next dimension)"),
    )
    .arg(
        Arg::new("dimension")
            .short('d')
            .long("dimension")
            .action(ArgAction::Append)
            .help("Declare a pivot axis as key=Label (can be specified multiple times)"),
    )
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("crosstab")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Brisas HR")
        .about("Pivot and export flat record collections")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(
            axis_args(
                Command::new("pivot")
                    .about("Cross-tabulate records by a row field and a column field")
                    .arg(file_arg()),
            )
            .arg(
                Arg::new("value")
                    .long("value")
                    .default_value("count")
                    .help("Cell reducer: count, sum:FIELD, avg:FIELD, min:FIELD, max:FIELD, distinct:FIELD"),
            )
            .arg(
                Arg::new("csv")
                    .long("csv")
                    .action(ArgAction::SetTrue)
                    .help("Print the pivot table as CSV"),
            ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records to CSV, always dropping credential fields")
                .arg(file_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .help("Destination file, or '-' for stdout"),
                )
                .arg(
                    Arg::new("exclude")
                        .short('e')
                        .long("exclude")
                        .action(ArgAction::Append)
                        .help("Drop fields matching glob pattern"),
                )
                .arg(
                    Arg::new("include")
                        .short('i')
                        .long("include")
                        .action(ArgAction::Append)
                        .help("Keep only fields matching glob pattern"),
                )
                .arg(
                    Arg::new("columns")
                        .long("columns")
                        .value_parser(["first", "union"])
                        .default_value("first")
                        .help("Take columns from the first record, or from every record"),
                ),
        )
        .subcommand(axis_args(
            Command::new("dimensions")
                .about("Show the pivot axes available for a record file")
                .arg(file_arg()),
        ))
}

/// Set up env_logger once; RUST_LOG still wins over -v
fn init_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches.get_count("verbose") > 1)
        .try_init();
}

/// Read records from a path, or JSON from stdin when the path is '-'
fn read_records(file: &str) -> anyhow::Result<Vec<Record>> {
    let records = if file == "-" {
        let input = std::io::read_to_string(std::io::stdin())?;
        parse_records(&input)?
    } else {
        load_records(file)?
    };
    log::info!(target: LOG_TARGET, "Read {} records from '{}'", records.len(), file);
    Ok(records)
}

/// Extract repeated string values from matches
fn extract_values<'a>(matches: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.map(String::as_str).collect())
        .unwrap_or_default()
}

/// Build the selector from declared or inferred dimensions and the axis flags
fn build_selector(matches: &ArgMatches, records: &[Record]) -> anyhow::Result<DimensionSelector> {
    let declared = extract_values(matches, "dimension")
        .into_iter()
        .map(str::parse::<Dimension>)
        .collect::<Result<Vec<_>, _>>()?;

    let dimensions = if declared.is_empty() {
        DimensionSet::infer(records)
    } else {
        DimensionSet::new(declared)?
    };
    if dimensions.len() < 2 {
        return Err(anyhow::anyhow!(
            "At least two dimensions are needed to pivot, found {}",
            dimensions.len()
        ));
    }

    let row = match matches.get_one::<String>("rows") {
        Some(key) => key.clone(),
        None => match matches.get_one::<String>("cols") {
            Some(col) => first_key_except(&dimensions, col),
            None => first_key_except(&dimensions, ""),
        },
    };
    let col = match matches.get_one::<String>("cols") {
        Some(key) => key.clone(),
        None => first_key_except(&dimensions, &row),
    };

    Ok(DimensionSelector::new(dimensions, &row, &col)?)
}

fn first_key_except(dimensions: &DimensionSet, skip: &str) -> String {
    dimensions
        .iter()
        .map(|d| d.key.clone())
        .find(|key| key != skip)
        .unwrap_or_default()
}

/// Handler for pivot command
fn pivot_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    init_logging(matches);
    let records = read_records(file_path(matches))?;
    let selector = build_selector(matches, &records)?;
    let reducer: Reducer = matches
        .get_one::<String>("value")
        .map(|s| s.parse::<Reducer>())
        .transpose()?
        .unwrap_or_default();

    let tab = selector.crosstab_with(&records, &reducer);
    let table = selector.table(&records, &reducer);

    // For JSON mode, return raw data
    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(json!({ "crosstab": tab, "table": table })));
    }

    if matches.get_flag("csv") {
        return Ok(Output::Render(json!({ "csv": table.to_csv() })));
    }

    Ok(Output::Render(serde_json::to_value(render::pivot_context(&table))?))
}

/// Handler for export command
fn export_handler(matches: &ArgMatches, _ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    init_logging(matches);
    let file = file_path(matches);
    let records = read_records(file)?;

    let columns: ColumnMode = matches
        .get_one::<String>("columns")
        .map(|s| s.parse::<ColumnMode>())
        .transpose()?
        .unwrap_or_default();
    let options = ExportOptions::new()
        .exclude_many(&extract_values(matches, "exclude"))?
        .include_many(&extract_values(matches, "include"))?
        .columns(columns);

    let out = matches
        .get_one::<String>("out")
        .map(String::as_str)
        .unwrap_or("-");

    if out == "-" {
        let mut sink = WriterSink::new(std::io::stdout().lock());
        download("export.csv", &records, &options, &mut sink)?;
        return Ok(Output::Silent);
    }

    let out_path = Path::new(out);
    let filename = out_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid output path '{}'", out))?;
    let dir = out_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut sink = DirectorySink::new(dir);
    let written = download(&filename, &records, &options, &mut sink)?;

    Ok(Output::Render(json!({
        "written": written,
        "path": out,
        "records": records.len(),
    })))
}

/// Handler for dimensions command
fn dimensions_handler(
    matches: &ArgMatches,
    ctx: &CommandContext,
) -> HandlerResult<serde_json::Value> {
    init_logging(matches);
    let records = read_records(file_path(matches))?;
    let selector = build_selector(matches, &records)?;

    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(json!({
            "row": selector.row(),
            "col": selector.col(),
            "row_options": selector.row_options(),
            "col_options": selector.col_options(),
        })));
    }

    Ok(Output::Render(serde_json::to_value(render::dimensions_context(&selector))?))
}

fn file_path(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("file")
        .map(String::as_str)
        .unwrap_or("-")
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("title", Style::new().bold())
}

fn main() -> ExitCode {
    let cmd = build_command();

    let result = App::builder()
        .theme(create_theme())
        .command("pivot", pivot_handler, PIVOT_TABLE_TEMPLATE)
        .command("export", export_handler, EXPORT_TEMPLATE)
        .command("dimensions", dimensions_handler, DIMENSIONS_TEMPLATE)
        .run_to_string(cmd, std::env::args());

    match result {
        RunResult::Handled(output) => {
            if !output.is_empty() {
                if output.starts_with("Error:") {
                    eprintln!("{}", output.trim_end());
                    return ExitCode::FAILURE;
                }
                print!("{}", output);
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(_) => {
            // subcommand_required keeps us from getting here with valid args
            eprintln!("Error: no command given, see 'crosstab --help'");
            ExitCode::FAILURE
        }
    }
}
