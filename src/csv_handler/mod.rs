//! CSV handler module
//!
//! Parses raw accelerometer CSV exports: the fixed preamble of device
//! metadata and the timestamped X, Y, Z rows that follow it.

pub mod preamble;
pub mod rows;

pub use preamble::{parse_preamble, CsvHeader, PreambleParser, PREAMBLE_LINES};
pub use rows::{
    parse_rows, read_csv_file, CsvRecording, DayStamp, ParsedRows, RowMode, TimeOfDay,
};
