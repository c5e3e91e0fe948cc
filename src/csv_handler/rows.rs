//! CSV data row parser.
//!
//! Rows follow the preamble and have the shape
//! `mm/dd/yyyy hh:mm:ss.fff,x,y,z`. The sample buffer is pre-sized from the
//! header's expected row count, but the rows actually present decide the
//! final metadata.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use super::preamble::{parse_preamble, CsvHeader, PREAMBLE_LINES};
use crate::error::{RawAccelError, Result};
use crate::util::{sample_count, NUM_SIGNALS, SIZE_PER_SIGNAL};

/// Largest row count a binary payload can describe.
const MAX_HINT_ROWS: u64 = u32::MAX as u64 / (NUM_SIGNALS as u64 * SIZE_PER_SIGNAL as u64);

/// Shortest possible data row, `m/d/yyyy h:m:s,x,y,z` plus the newline.
const MIN_ROW_BYTES: u64 = 21;

/// How much of each row to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    /// Keep only the X, Y, Z values.
    #[default]
    Fast,
    /// Also decompose each row's timestamp into date and time components.
    Full,
}

/// Calendar date of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayStamp {
    pub month: u32,
    pub day: u32,
    pub year: i32,
}

/// Time of day of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: f32,
}

/// Rows parsed from the body of a CSV export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    /// Interleaved X, Y, Z values, three per row.
    pub samples: Vec<f32>,
    /// Per-row dates; empty in [`RowMode::Fast`].
    pub days: Vec<DayStamp>,
    /// Per-row times of day; empty in [`RowMode::Fast`].
    pub times: Vec<TimeOfDay>,
}

impl ParsedRows {
    pub fn row_count(&self) -> u64 {
        (self.samples.len() / 3) as u64
    }
}

/// A CSV export loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecording {
    /// Header metadata, recomputed if the row count disagreed with it.
    pub header: CsvHeader,
    pub rows: ParsedRows,
    /// Row count implied by the preamble's duration and sample rate.
    pub expected_rows: u64,
}

impl CsvRecording {
    /// True when the header was rewritten to match the rows actually read.
    pub fn was_recovered(&self) -> bool {
        self.rows.row_count() != self.expected_rows
    }

    pub fn record_count(&self) -> u64 {
        self.rows.row_count()
    }
}

/// Parse data rows from `reader`, which must be positioned after the preamble.
///
/// `expected_rows` is a capacity hint only: it is clamped to what a binary
/// payload can hold, and the buffers grow normally if the reservation fails.
/// Blank and whitespace-only lines are skipped. A malformed row followed by
/// more rows is a [`RawAccelError::Format`] error; a malformed final row is
/// treated as a truncated tail and dropped.
pub fn parse_rows<R: Read>(reader: R, expected_rows: u64, mode: RowMode) -> Result<ParsedRows> {
    let hint = expected_rows.min(MAX_HINT_ROWS);
    let mut rows = ParsedRows::default();
    reserve_hint(&mut rows.samples, hint * 3);
    if mode == RowMode::Full {
        reserve_hint(&mut rows.days, hint);
        reserve_hint(&mut rows.times, hint);
    }

    let csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = csv_reader
        .into_records()
        .filter(|result| !matches!(result, Ok(record) if is_blank(record)))
        .peekable();

    while let Some(result) = records.next() {
        let parsed = result
            .map_err(RawAccelError::from)
            .and_then(|record| parse_row(&record, mode));

        match parsed {
            Ok((xyz, stamp)) => {
                rows.samples.extend_from_slice(&xyz);
                if let Some((day, time)) = stamp {
                    rows.days.push(day);
                    rows.times.push(time);
                }
            }
            Err(e) if records.peek().is_none() => {
                tracing::warn!("Dropping malformed final row: {}", e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(rows)
}

/// Open and parse a whole CSV export.
///
/// When the number of rows read differs from the number the preamble
/// implies, the rows win: the header's duration and stop instant are
/// recomputed from the row count.
pub fn read_csv_file(path: &Path, mode: RowMode) -> Result<CsvRecording> {
    tracing::info!("Opening {} for reading", path.display());
    let file = File::open(path).map_err(|e| {
        tracing::error!("Unable to open the csv file '{}'", path.display());
        RawAccelError::from_open(path, e)
    })?;
    let mut reader = BufReader::new(file);

    let mut header = parse_preamble(&mut reader)?;
    let expected_rows = sample_count(header.duration_sec, header.samplerate);
    tracing::info!("Sample rate is {}", header.samplerate);
    tracing::info!("Duration: {:.1} s", header.duration_sec);
    tracing::info!("Expected row count: {}", expected_rows);

    // A corrupted download date can imply far more rows than the file holds
    let row_hint = match reader.get_ref().metadata() {
        Ok(meta) => expected_rows.min(meta.len() / MIN_ROW_BYTES),
        Err(_) => expected_rows,
    };
    let rows = parse_rows(reader, row_hint, mode)?;

    let actual_rows = rows.row_count();
    if actual_rows != expected_rows {
        tracing::warn!(
            "The CSV file, {}, may be corrupted: only {} of {} records found!",
            path.display(),
            actual_rows,
            expected_rows
        );
        header.apply_row_count(actual_rows);
    }

    Ok(CsvRecording {
        header,
        rows,
        expected_rows,
    })
}

type RowValues = ([f32; 3], Option<(DayStamp, TimeOfDay)>);

fn parse_row(record: &StringRecord, mode: RowMode) -> Result<RowValues> {
    let line = record
        .position()
        .map_or(0, |p| p.line() + PREAMBLE_LINES);

    if record.len() != 4 {
        return Err(RawAccelError::format(
            line,
            format!("expected 4 fields but got {}", record.len()),
        ));
    }

    let mut xyz = [0f32; 3];
    for (axis, value) in xyz.iter_mut().enumerate() {
        let field = &record[axis + 1];
        *value = field.parse().map_err(|_| {
            RawAccelError::format(line, format!("invalid acceleration value '{}'", field))
        })?;
    }

    let stamp = split_timestamp(&record[0]).ok_or_else(|| {
        RawAccelError::format(line, format!("invalid timestamp '{}'", &record[0]))
    })?;
    let stamp = match mode {
        RowMode::Fast => None,
        RowMode::Full => Some(stamp),
    };

    Ok((xyz, stamp))
}

/// Split `mm/dd/yyyy hh:mm:ss.fff` into its date and time components.
fn split_timestamp(field: &str) -> Option<(DayStamp, TimeOfDay)> {
    let (date, time) = field.split_once(' ')?;

    let mut date_parts = date.split('/');
    let day = DayStamp {
        month: date_parts.next()?.parse().ok()?,
        day: date_parts.next()?.parse().ok()?,
        year: date_parts.next()?.parse().ok()?,
    };

    let mut time_parts = time.trim().split(':');
    let time = TimeOfDay {
        hour: time_parts.next()?.parse().ok()?,
        minute: time_parts.next()?.parse().ok()?,
        second: time_parts.next()?.parse().ok()?,
    };

    if date_parts.next().is_some() || time_parts.next().is_some() {
        return None;
    }
    Some((day, time))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Pre-size `buf` for `count` items, leaving it to grow on demand if that fails.
fn reserve_hint<T>(buf: &mut Vec<T>, count: u64) {
    let reserved = usize::try_from(count)
        .ok()
        .is_some_and(|count| buf.try_reserve_exact(count).is_ok());
    if !reserved {
        tracing::debug!("Could not pre-size buffer for {} items, growing on demand", count);
    }
}
