//! CSV to binary conversion
//!
//! Parses a raw CSV export in fast mode, derives a binary header from its
//! metadata and writes header plus payload to the destination file.
//!
//! # Example
//!
//! ```no_run
//! use raw_accel::converter::CsvConverter;
//! use std::path::Path;
//!
//! let converter = CsvConverter::new(false);
//! let stats = converter.convert(
//!     Path::new("raw.csv"),
//!     Path::new("raw.bin"),
//! ).unwrap();
//!
//! println!("Wrote {} records", stats.records_written);
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::binary::{write_binary, BinHeader, HEADER_SIZE};
use crate::csv_handler::{read_csv_file, RowMode};
use crate::error::{RawAccelError, Result};

/// Statistics collected during a conversion.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionStats {
    /// Rows implied by the CSV preamble.
    pub expected_records: u64,
    /// Rows actually parsed and written.
    pub records_written: u64,
    /// Header duration after any recovery.
    pub duration_sec: f64,
    /// Header plus payload bytes written.
    pub bytes_written: u64,
}

impl ConversionStats {
    /// True when the CSV held a different number of rows than its preamble implied.
    pub fn is_recovered(&self) -> bool {
        self.expected_records != self.records_written
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion Report")?;
        writeln!(f, "=================")?;
        writeln!(
            f,
            "Status: {}",
            if self.is_recovered() {
                "RECOVERED"
            } else {
                "SUCCESS"
            }
        )?;
        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "  Expected records:  {:>12}", self.expected_records)?;
        writeln!(f, "  Records written:   {:>12}", self.records_written)?;
        writeln!(f, "  Duration (s):      {:>12.3}", self.duration_sec)?;
        write!(f, "  Bytes written:     {:>12}", self.bytes_written)
    }
}

/// Converts raw CSV exports to the binary format.
pub struct CsvConverter {
    /// Keep a partially written destination after a failure.
    keep_partial: bool,
}

impl CsvConverter {
    /// Creates a converter.
    ///
    /// # Arguments
    ///
    /// * `keep_partial` - If true, a destination file left incomplete by a
    ///   failed write is kept on disk instead of being removed.
    pub fn new(keep_partial: bool) -> Self {
        Self { keep_partial }
    }

    /// Convert `input` (CSV) to `output` (binary).
    ///
    /// The CSV is parsed completely before the destination is opened, so a
    /// parse failure never touches `output`.
    ///
    /// # Errors
    ///
    /// Any parse error from the CSV reader, [`RawAccelError::Io`] if the
    /// destination cannot be created, [`RawAccelError::PayloadTooLarge`] if the
    /// recording does not fit the format, and
    /// [`RawAccelError::TruncatedWrite`] if the destination stops accepting
    /// bytes.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionStats> {
        let recording = read_csv_file(input, RowMode::Fast)?;
        let header = BinHeader::from_csv_header(&recording.header)?;

        let mut destination = PartialOutput::create(output, self.keep_partial)?;
        destination.write_with(|writer| write_binary(writer, &header, &recording.rows.samples))?;
        destination.commit()?;

        Ok(ConversionStats {
            expected_records: recording.expected_rows,
            records_written: recording.record_count(),
            duration_sec: header.duration_sec,
            bytes_written: HEADER_SIZE as u64 + u64::from(header.sz_remaining),
        })
    }
}

/// Destination file that is removed on drop unless committed.
struct PartialOutput {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    keep: bool,
}

impl PartialOutput {
    fn create(path: &Path, keep: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                tracing::error!("Could not open file for writing: {}", path.display());
                RawAccelError::Io(e)
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            keep,
        })
    }

    fn write_with<F>(&mut self, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        match self.writer.as_mut() {
            Some(writer) => write(writer),
            None => Err(RawAccelError::Io(std::io::Error::other(
                "output already closed",
            ))),
        }
    }

    fn commit(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer.into_inner().map_err(|e| RawAccelError::Io(e.into_error()))?;
            file.sync_all()?;
        }
        self.keep = true;
        Ok(())
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        // Close the handle before removing the file
        self.writer.take();
        if !self.keep {
            tracing::warn!("Removing incomplete output {}", self.path.display());
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::error!("Could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}
