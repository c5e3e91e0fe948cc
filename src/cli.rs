//! CLI argument parsing module
//!
//! Handles command-line argument parsing using `clap` derive macros.
//! The operation is chosen by how many paths are given: one path loads a
//! file and reports its record count, two paths convert a CSV export into
//! the binary format.

use clap::Parser;
use std::path::PathBuf;

/// Operation selected from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a binary file (or a `.csv` export) and report its record count.
    Load {
        path: PathBuf,
        /// Parse CSV rows in full mode.
        full: bool,
    },
    /// Convert a CSV export to the binary format.
    Convert {
        source: PathBuf,
        destination: PathBuf,
    },
}

/// Command-line arguments for the converter.
///
/// Use the `validate()` method after parsing to turn the arguments into a
/// [`Command`].
///
/// # Example
///
/// ```rust,ignore
/// use clap::Parser;
/// use raw_accel::cli::Args;
///
/// let args = Args::parse();
/// let command = args.validate()?;
/// ```
#[derive(Parser, Debug)]
#[command(name = "rawcsv2rawbin")]
#[command(about = "Convert raw accelerometer CSV exports to binary, or load either format")]
#[command(version)]
pub struct Args {
    /// <raw .bin or .csv file> to load, or <raw .csv file> <raw .bin file> to convert
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Decompose row timestamps when loading a CSV export
    #[arg(long, default_value = "false")]
    pub full: bool,

    /// Print the loaded header as JSON instead of a text report
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Keep a partially written binary file when conversion fails
    #[arg(long, default_value = "false")]
    pub keep_partial: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short = 'q', long, default_value = "false")]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations and select the command.
    ///
    /// # Returns
    ///
    /// - `Ok(Command)` for one path (load) or two paths (convert)
    /// - `Err(String)` with a descriptive message otherwise
    pub fn validate(&self) -> Result<Command, String> {
        if self.quiet && self.verbose > 0 {
            return Err("--quiet cannot be used with --verbose".to_string());
        }

        match self.paths.as_slice() {
            [path] => Ok(Command::Load {
                path: path.clone(),
                full: self.full,
            }),
            [source, destination] => {
                if self.full {
                    return Err("--full only applies when loading a single file".to_string());
                }
                if source == destination {
                    return Err("source and destination must differ".to_string());
                }
                Ok(Command::Convert {
                    source: source.clone(),
                    destination: destination.clone(),
                })
            }
            paths => Err(format!("expected 1 or 2 paths, got {}", paths.len())),
        }
    }

    /// Default log filter directive for the selected verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// True if `path` names a CSV export rather than a binary file.
pub fn is_csv_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
