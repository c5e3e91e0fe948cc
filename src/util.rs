//! Utility functions shared by the CSV and binary code paths.
//!
//! This module holds the duration → sample-count rounding policy, the local
//! calendar time conversions used for recording bounds, and the stopwatch
//! used to report elapsed time around each operation.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Number of signal channels per sample (X, Y, Z).
pub const NUM_SIGNALS: u32 = 3;

/// Size in bytes of one stored signal value (an `f32`).
pub const SIZE_PER_SIGNAL: u32 = std::mem::size_of::<f32>() as u32;

/// Products closer than this to a whole number are treated as that number.
const SAMPLE_SNAP_TOLERANCE: f64 = 1e-6;

/// Convert a duration in seconds to a whole number of samples.
///
/// The count is `floor(duration_sec * samplerate)`, except that a product
/// within [`SAMPLE_SNAP_TOLERANCE`] of an integer snaps to that integer. This
/// keeps `sample_count(rows as f64 / rate as f64, rate) == rows` for every
/// recovered duration. Negative or non-finite durations yield zero.
#[must_use]
pub fn sample_count(duration_sec: f64, samplerate: u32) -> u64 {
    let exact = duration_sec * f64::from(samplerate);
    if !exact.is_finite() || exact <= 0.0 {
        return 0;
    }
    let nearest = exact.round();
    if (exact - nearest).abs() < SAMPLE_SNAP_TOLERANCE {
        nearest as u64
    } else {
        exact.floor() as u64
    }
}

/// Byte length of the float payload for a recording of the given shape.
#[must_use]
pub fn payload_bytes(duration_sec: f64, samplerate: u32) -> u64 {
    u64::from(NUM_SIGNALS) * u64::from(SIZE_PER_SIGNAL) * sample_count(duration_sec, samplerate)
}

/// Convert local calendar time to epoch seconds.
///
/// Returns `None` for a time that does not exist locally (a DST gap). An
/// ambiguous time resolves to the earlier instant.
#[must_use]
pub fn local_to_epoch(naive: &NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Convert epoch seconds back to local time.
#[must_use]
pub fn epoch_to_local(secs: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local))
}

/// Format epoch seconds the way `asctime` does, for log output.
#[must_use]
pub fn format_epoch(secs: i64) -> String {
    match epoch_to_local(secs) {
        Some(dt) => dt.format("%a %b %e %H:%M:%S %Y").to_string(),
        None => format!("<invalid time {}>", secs),
    }
}

/// Wall-clock timer started around a single operation.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the elapsed time at info level.
    pub fn report(&self, label: &str) {
        tracing::info!(
            "{} finished in {:.3} s",
            label,
            self.elapsed().as_secs_f64()
        );
    }
}
