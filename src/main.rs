//! rawcsv2rawbin - Convert raw accelerometer exports to a compact binary format
//!
//! This CLI tool dispatches on the number of paths given:
//! - **One path**: load a binary file (or a `.csv` export) and report its records
//! - **Two paths**: convert a CSV export to the binary format
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Usage/argument error |
//! | 3 | File I/O error |
//! | 4 | Data error (malformed input, payload mismatch) |

use clap::{CommandFactory, Parser};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use raw_accel::binary::read_binary_file;
use raw_accel::cli::{is_csv_path, Args, Command};
use raw_accel::converter::CsvConverter;
use raw_accel::csv_handler::{read_csv_file, RowMode};
use raw_accel::error::RawAccelError;
use raw_accel::util::Stopwatch;

/// Exit code for success
const EXIT_SUCCESS: u8 = 0;
/// Exit code for usage/argument errors
const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for file I/O errors
const EXIT_IO_ERROR: u8 = 3;
/// Exit code for malformed or inconsistent data
const EXIT_DATA_ERROR: u8 = 4;

fn main() -> ExitCode {
    let args = Args::parse();

    let command = match args.validate() {
        Ok(command) => command,
        Err(message) => {
            let error = RawAccelError::InvalidArgument(message);
            eprintln!("Error: {}", error);
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::from(error_to_exit_code(&error));
        }
    };

    init_logging(&args);

    match run(&args, command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("FAIL");
            ExitCode::from(error_to_exit_code(&e))
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the CLI verbosity.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args, command: Command) -> Result<(), RawAccelError> {
    let stopwatch = Stopwatch::start();
    match command {
        Command::Load { path, full } => {
            if is_csv_path(&path) {
                run_load_csv(&path, full, args.json)?;
            } else {
                run_load_binary(&path, args.json)?;
            }
            stopwatch.report("Load");
        }
        Command::Convert {
            source,
            destination,
        } => {
            let converter = CsvConverter::new(args.keep_partial);
            let stats = converter.convert(&source, &destination)?;
            println!("{}", stats);
            stopwatch.report("Conversion");
        }
    }
    Ok(())
}

/// Load a binary file and report its header and record count.
fn run_load_binary(path: &Path, json: bool) -> Result<(), RawAccelError> {
    let recording = read_binary_file(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recording.header)?);
    } else {
        println!("{}", recording.header);
    }
    tracing::info!("Loaded {} records", recording.record_count());
    Ok(())
}

/// Parse a CSV export and report its header and record count.
fn run_load_csv(path: &Path, full: bool, json: bool) -> Result<(), RawAccelError> {
    let mode = if full { RowMode::Full } else { RowMode::Fast };
    let recording = read_csv_file(path, mode)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recording.header)?);
    } else {
        println!("{}", recording.header);
    }
    tracing::info!("Loaded {} records", recording.record_count());
    Ok(())
}

/// Convert an error to the appropriate exit code.
fn error_to_exit_code(error: &RawAccelError) -> u8 {
    match error {
        RawAccelError::InvalidArgument(_) => EXIT_CONFIG_ERROR,
        RawAccelError::Io(_)
        | RawAccelError::NotFound { .. }
        | RawAccelError::TruncatedRead { .. }
        | RawAccelError::TruncatedWrite { .. }
        | RawAccelError::Csv(_)
        | RawAccelError::Json(_) => EXIT_IO_ERROR,
        RawAccelError::Format { .. }
        | RawAccelError::Allocation { .. }
        | RawAccelError::PayloadMismatch { .. }
        | RawAccelError::PayloadTooLarge { .. }
        | RawAccelError::IdentifierTooLong { .. }
        | RawAccelError::Pattern(_) => EXIT_DATA_ERROR,
    }
}
