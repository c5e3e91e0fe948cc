//! Error module
//!
//! Defines the error type shared by the CSV parsers, the binary codec and the
//! converter. Every fallible operation in the crate returns [`Result`].

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RawAccelError>;

/// The main error type for raw accelerometer conversion.
///
/// # Error Categories
///
/// - **File I/O errors**: open/seek failures, short reads and short writes
/// - **Format errors**: a CSV preamble line or data row that does not match
///   the expected layout
/// - **Data errors**: payloads that disagree with their header, allocation
///   failures and identifiers that exceed their fixed width
///
/// # Example
///
/// ```rust,ignore
/// use raw_accel::error::RawAccelError;
///
/// fn example() -> Result<(), RawAccelError> {
///     let file = std::fs::File::open("missing.bin")?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum RawAccelError {
    /// General I/O error (open, seek, read or write failure).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that could not be opened.
        path: PathBuf,
    },

    /// Fewer bytes were available than a header or payload requires.
    #[error("Truncated read: expected {expected} bytes, got {actual}")]
    TruncatedRead {
        /// Bytes the reader asked for.
        expected: u64,
        /// Bytes actually read before end of stream.
        actual: u64,
    },

    /// A header or payload block could not be written completely.
    #[error("Truncated write: expected {expected} bytes, wrote {actual}")]
    TruncatedWrite {
        /// Bytes the writer tried to write.
        expected: u64,
        /// Bytes accepted by the destination.
        actual: u64,
    },

    /// A CSV preamble line or data row did not match its expected layout.
    #[error("Format error at line {line}: {message}")]
    Format {
        /// 1-based line number in the source file.
        line: u64,
        /// What was expected and what was found.
        message: String,
    },

    /// A sample buffer could not be allocated.
    #[error("Could not allocate {bytes} bytes for sample data")]
    Allocation {
        /// Requested buffer size in bytes.
        bytes: u64,
    },

    /// The payload handed to the writer does not match the header's size field.
    #[error("Payload mismatch: header declares {header_bytes} bytes, payload has {payload_bytes}")]
    PayloadMismatch {
        /// `sz_remaining` from the header.
        header_bytes: u64,
        /// Byte length of the samples provided.
        payload_bytes: u64,
    },

    /// The derived payload size does not fit the 32-bit size field.
    #[error("Payload of {bytes} bytes exceeds the 32-bit size field")]
    PayloadTooLarge {
        /// Derived payload size in bytes.
        bytes: u64,
    },

    /// An identifier does not fit its fixed-width field.
    #[error("Identifier is {actual} bytes, at most {max} allowed")]
    IdentifierTooLong {
        /// Maximum number of bytes (excluding the terminator).
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// CSV tokenizer error from the csv crate.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A preamble extraction pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RawAccelError {
    /// Builds a [`RawAccelError::Format`] for the given line.
    pub fn format(line: u64, message: impl Into<String>) -> Self {
        RawAccelError::Format {
            line,
            message: message.into(),
        }
    }

    /// Maps an open failure to [`RawAccelError::NotFound`] when the file is missing.
    pub fn from_open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            RawAccelError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RawAccelError::Io(err)
        }
    }
}
