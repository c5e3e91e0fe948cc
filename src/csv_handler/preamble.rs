//! CSV preamble parser.
//!
//! A device export starts with eleven fixed lines before the data rows:
//!
//! ```text
//! ------------ Data File Created By ActiGraph GT3X+ ActiLife v6.11.8 Firmware v1.5.0 date format M/d/yyyy at 40 Hz  Filter Normal -----------
//! Serial Number: MOS2B21140207
//! Start Time 00:00:00
//! Start Date 12/9/2015
//! Epoch Period (hh:mm:ss) 00:00:00
//! Download Time 10:07:01
//! Download Date 12/17/2015
//! Current Memory Address: 0
//! Current Battery Voltage: 3.93     Mode = 12
//! --------------------------------------------------
//! Timestamp,Accelerometer X,Accelerometer Y,Accelerometer Z
//! ```
//!
//! Lines are matched by position. Each line has one extraction rule; a line
//! that does not match its rule is a [`RawAccelError::Format`] error.

use std::fmt;
use std::io::BufRead;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::binary::{Firmware, SerialId};
use crate::error::{RawAccelError, Result};
use crate::util::{format_epoch, local_to_epoch};

/// Number of lines preceding the first data row.
pub const PREAMBLE_LINES: u64 = 11;

/// Device metadata and recording bounds parsed from the preamble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvHeader {
    pub serial_id: SerialId,
    pub firmware: Firmware,
    /// Samples per second, always positive.
    pub samplerate: u32,
    /// Recording start, local epoch seconds.
    pub start: i64,
    /// Recording stop, local epoch seconds.
    pub stop: i64,
    /// `stop - start` in seconds, or `rows / samplerate` after recovery.
    pub duration_sec: f64,
}

impl CsvHeader {
    /// Make the metadata agree with the number of rows actually read.
    ///
    /// The duration becomes `rows / samplerate` and the stop instant becomes
    /// the start plus the whole seconds of that duration. A zero sample rate
    /// yields a zero duration.
    pub fn apply_row_count(&mut self, rows: u64) {
        self.duration_sec = if self.samplerate == 0 {
            0.0
        } else {
            rows as f64 / f64::from(self.samplerate)
        };
        self.stop = self.start.saturating_add(self.duration_sec.trunc() as i64);
        tracing::warn!("New duration seconds: {}", self.duration_sec);
        tracing::warn!("New stop time calculated as: {}", format_epoch(self.stop));
    }
}

impl fmt::Display for CsvHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CSV Header")?;
        writeln!(f, "==========")?;
        writeln!(f, "  Serial number:     {:>24}", self.serial_id)?;
        writeln!(f, "  Firmware:          {:>24}", self.firmware)?;
        writeln!(f, "  Sample rate (Hz):  {:>24}", self.samplerate)?;
        writeln!(f, "  Start:             {:>24}", format_epoch(self.start))?;
        writeln!(f, "  Stop:              {:>24}", format_epoch(self.stop))?;
        write!(f, "  Duration (s):      {:>24.3}", self.duration_sec)
    }
}

/// What a preamble line contributes to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreambleLine {
    Banner,
    SerialNumber,
    StartTime,
    StartDate,
    DownloadTime,
    DownloadDate,
    Ignored(&'static str),
}

const PREAMBLE: [PreambleLine; PREAMBLE_LINES as usize] = [
    PreambleLine::Banner,
    PreambleLine::SerialNumber,
    PreambleLine::StartTime,
    PreambleLine::StartDate,
    PreambleLine::Ignored("epoch period"),
    PreambleLine::DownloadTime,
    PreambleLine::DownloadDate,
    PreambleLine::Ignored("memory address"),
    PreambleLine::Ignored("battery voltage"),
    PreambleLine::Ignored("separator"),
    PreambleLine::Ignored("column header"),
];

impl PreambleLine {
    fn describe(self) -> &'static str {
        match self {
            PreambleLine::Banner => "banner with 'Firmware v<version> ... at <rate> Hz'",
            PreambleLine::SerialNumber => "'Serial Number: <id>'",
            PreambleLine::StartTime => "'Start Time hh:mm:ss'",
            PreambleLine::StartDate => "'Start Date mm/dd/yyyy'",
            PreambleLine::DownloadTime => "'Download Time hh:mm:ss'",
            PreambleLine::DownloadDate => "'Download Date mm/dd/yyyy'",
            PreambleLine::Ignored(name) => name,
        }
    }
}

/// Compiled extraction rules, one per meaningful preamble line.
#[derive(Debug, Clone)]
pub struct PreambleParser {
    banner: Regex,
    serial: Regex,
    start_time: Regex,
    start_date: Regex,
    download_time: Regex,
    download_date: Regex,
}

/// Fields collected while walking the preamble.
#[derive(Default)]
struct Collected {
    firmware: Option<String>,
    samplerate: Option<u32>,
    serial: Option<String>,
    start_time: Option<NaiveTime>,
    start_date: Option<NaiveDate>,
    stop_time: Option<NaiveTime>,
    stop_date: Option<NaiveDate>,
}

impl PreambleParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            banner: Regex::new(r"Firmware\s+v?(?P<firmware>\S+).*?\bat\s+(?P<rate>\d+)\s*Hz")?,
            serial: Regex::new(r"^Serial Number:\s*(?P<serial>\S+)")?,
            start_time: time_rule("Start Time")?,
            start_date: date_rule("Start Date")?,
            download_time: time_rule("Download Time")?,
            download_date: date_rule("Download Date")?,
        })
    }

    /// Extract `(firmware, samplerate)` from the banner line.
    pub fn extract_banner(&self, line: &str) -> Option<(String, u32)> {
        let caps = self.banner.captures(line)?;
        let rate = caps["rate"].parse().ok()?;
        Some((caps["firmware"].to_string(), rate))
    }

    /// Extract the serial number from a `Serial Number:` line.
    pub fn extract_serial(&self, line: &str) -> Option<String> {
        self.serial
            .captures(line)
            .map(|caps| caps["serial"].to_string())
    }

    /// Extract the recording start time of day.
    pub fn extract_start_time(&self, line: &str) -> Option<NaiveTime> {
        self.start_time.captures(line).and_then(|c| time_from(&c))
    }

    /// Extract the recording start date.
    pub fn extract_start_date(&self, line: &str) -> Option<NaiveDate> {
        self.start_date.captures(line).and_then(|c| date_from(&c))
    }

    /// Extract the download (stop) time of day.
    pub fn extract_download_time(&self, line: &str) -> Option<NaiveTime> {
        self.download_time.captures(line).and_then(|c| time_from(&c))
    }

    /// Extract the download (stop) date.
    pub fn extract_download_date(&self, line: &str) -> Option<NaiveDate> {
        self.download_date.captures(line).and_then(|c| date_from(&c))
    }

    /// Consume the preamble from `reader` and build a [`CsvHeader`].
    ///
    /// On success the reader is positioned at the first data row.
    pub fn parse<R: BufRead>(&self, reader: &mut R) -> Result<CsvHeader> {
        let mut collected = Collected::default();
        let mut buf = String::new();

        for (index, rule) in PREAMBLE.iter().copied().enumerate() {
            let line_no = index as u64 + 1;
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(RawAccelError::format(
                    line_no,
                    format!("unexpected end of file, expected {}", rule.describe()),
                ));
            }
            let line = buf.trim_end_matches(['\r', '\n']);
            let mismatch = || {
                RawAccelError::format(
                    line_no,
                    format!("expected {}, found '{}'", rule.describe(), line),
                )
            };

            match rule {
                PreambleLine::Banner => {
                    let (firmware, rate) = self.extract_banner(line).ok_or_else(mismatch)?;
                    collected.firmware = Some(firmware);
                    collected.samplerate = Some(rate);
                }
                PreambleLine::SerialNumber => {
                    collected.serial = Some(self.extract_serial(line).ok_or_else(mismatch)?);
                }
                PreambleLine::StartTime => {
                    collected.start_time = Some(self.extract_start_time(line).ok_or_else(mismatch)?);
                }
                PreambleLine::StartDate => {
                    collected.start_date = Some(self.extract_start_date(line).ok_or_else(mismatch)?);
                }
                PreambleLine::DownloadTime => {
                    collected.stop_time =
                        Some(self.extract_download_time(line).ok_or_else(mismatch)?);
                }
                PreambleLine::DownloadDate => {
                    collected.stop_date =
                        Some(self.extract_download_date(line).ok_or_else(mismatch)?);
                }
                PreambleLine::Ignored(name) => {
                    tracing::debug!("Preamble {}: {}", name, line);
                }
            }
        }

        collected.into_header()
    }
}

impl Collected {
    fn into_header(self) -> Result<CsvHeader> {
        // Every field is filled once the fixed preamble has been walked
        let (
            Some(firmware),
            Some(samplerate),
            Some(serial),
            Some(start_time),
            Some(start_date),
            Some(stop_time),
            Some(stop_date),
        ) = (
            self.firmware,
            self.samplerate,
            self.serial,
            self.start_time,
            self.start_date,
            self.stop_time,
            self.stop_date,
        )
        else {
            return Err(RawAccelError::format(PREAMBLE_LINES, "incomplete preamble"));
        };

        if samplerate == 0 {
            return Err(RawAccelError::format(1, "sample rate must be positive"));
        }

        let start = to_epoch(NaiveDateTime::new(start_date, start_time), 4)?;
        let stop = to_epoch(NaiveDateTime::new(stop_date, stop_time), 7)?;
        if stop < start {
            return Err(RawAccelError::format(
                7,
                format!(
                    "download time {} precedes start time {}",
                    format_epoch(stop),
                    format_epoch(start)
                ),
            ));
        }

        if firmware.len() > Firmware::MAX_LEN {
            tracing::warn!("Firmware '{}' truncated to {} bytes", firmware, Firmware::MAX_LEN);
        }
        if serial.len() > SerialId::MAX_LEN {
            tracing::warn!("Serial '{}' truncated to {} bytes", serial, SerialId::MAX_LEN);
        }

        tracing::info!("Start time: {}", format_epoch(start));
        tracing::info!("Stop time: {}", format_epoch(stop));
        tracing::info!("Serial: {}", serial);

        Ok(CsvHeader {
            serial_id: SerialId::truncating(&serial),
            firmware: Firmware::truncating(&firmware),
            samplerate,
            start,
            stop,
            duration_sec: (stop - start) as f64,
        })
    }
}

/// Parse a preamble with a freshly compiled [`PreambleParser`].
pub fn parse_preamble<R: BufRead>(reader: &mut R) -> Result<CsvHeader> {
    PreambleParser::new()?.parse(reader)
}

fn time_rule(prefix: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"^{}\s+(?P<h>\d{{1,2}}):(?P<m>\d{{1,2}}):(?P<s>\d{{1,2}})",
        regex::escape(prefix)
    ))?)
}

fn date_rule(prefix: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"^{}\s+(?P<mon>\d{{1,2}})/(?P<day>\d{{1,2}})/(?P<year>\d{{4}})",
        regex::escape(prefix)
    ))?)
}

fn time_from(caps: &Captures<'_>) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(
        caps["h"].parse().ok()?,
        caps["m"].parse().ok()?,
        caps["s"].parse().ok()?,
    )
}

fn date_from(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        caps["year"].parse().ok()?,
        caps["mon"].parse().ok()?,
        caps["day"].parse().ok()?,
    )
}

fn to_epoch(naive: NaiveDateTime, line: u64) -> Result<i64> {
    local_to_epoch(&naive).ok_or_else(|| {
        RawAccelError::format(line, format!("{} does not exist in local time", naive))
    })
}
