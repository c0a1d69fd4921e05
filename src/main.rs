//! xlsxjobs command-line front-end
//!
//! ```text
//! xlsxjobs <DIR> <SPREADSHEET> [--corrections FILE] [--node-id ID] [--sort] [--keys] [--stdout]
//! ```
//!
//! ログレベルは`RUST_LOG`で指定します（デフォルト: `info`）。

use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use xlsxjobs::{load_schema, ConverterBuilder, Corrections, XlsxJobsError};

/// Compile spreadsheet job definitions into scheduler FOLDER/JOB XML
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Working directory holding config.json and the override fragments
    dir: PathBuf,

    /// Spreadsheet with one job definition per row
    spreadsheet: PathBuf,

    /// JSON file with interval, time and notification corrections
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Override for the NODEID attribute
    #[arg(long)]
    node_id: Option<String>,

    /// Header rows to skip before the data
    #[arg(long, default_value_t = xlsxjobs::DEFAULT_HEADER_ROWS)]
    header_rows: usize,

    /// Sort rows by group key so each group becomes a single FOLDER
    #[arg(long)]
    sort: bool,

    /// Print the derived correction keys as JSON instead of compiling
    #[arg(long)]
    keys: bool,

    /// Print the XML to stdout instead of writing output.xml
    #[arg(long)]
    stdout: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        handle_error(e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), XlsxJobsError> {
    let converter = ConverterBuilder::new()
        .with_header_rows(args.header_rows)
        .sort_rows(args.sort)
        .build()?;

    let input = File::open(&args.spreadsheet)?;

    if args.keys {
        let rows = converter.read_rows(input)?;
        let keys = converter.derive_keys(&rows);
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }

    let mut corrections = match &args.corrections {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => Corrections::new(),
    };
    if let Some(node_id) = args.node_id {
        corrections.node_id = Some(node_id);
    }

    if args.stdout {
        let schema = load_schema(&args.dir)?;
        converter.convert(input, &schema, &corrections, std::io::stdout())?;
    } else {
        let path = converter.convert_in_dir(&args.dir, input, &corrections)?;
        info!("done: {}", path.display());
    }

    Ok(())
}

fn handle_error(error: XlsxJobsError) {
    match error {
        XlsxJobsError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        XlsxJobsError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid spreadsheet or may be corrupted.");
        }
        XlsxJobsError::Json(json_err) => {
            eprintln!("JSON Error: {}", json_err);
            eprintln!("Please check the corrections file.");
        }
        XlsxJobsError::ConfigMissing { file, reason } => {
            eprintln!("Missing Schema File: {}", file);
            eprintln!("  Details: {}", reason);
            eprintln!("The working directory must contain config.json and the five override fragments.");
        }
        XlsxJobsError::ScheduleTargetMissing(section) => {
            eprintln!("Override Target Missing: {}", section);
            eprintln!("config.json has no section named '{}'.", section);
        }
        XlsxJobsError::RowShapeMismatch { row, column } => {
            eprintln!("Invalid Row: data row {} has no value in column {}", row, column);
            eprintln!("No output was written.");
        }
        XlsxJobsError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
            eprintln!("The input violates security constraints (e.g., file size limit).");
        }
        other => eprintln!("Error: {}", other),
    }
}
