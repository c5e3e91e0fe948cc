//! Fixed-layout binary header and its codec.
//!
//! The header is written verbatim at offset 0 of every binary file:
//!
//! | offset | field | type |
//! |---|---|---|
//! | 0 | samplerate | `u32` |
//! | 4 | start_time | `i64` epoch seconds |
//! | 12 | stop_time | `i64` epoch seconds |
//! | 20 | duration_sec | `f64` |
//! | 28 | firmware | `[u8; 16]`, NUL-terminated |
//! | 44 | serial_id | `[u8; 16]`, NUL-terminated |
//! | 60 | num_signals | `u32` |
//! | 64 | sz_per_signal | `u32` |
//! | 68 | sz_remaining | `u32` |
//!
//! All integers and floats are little-endian with no padding.

use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};

use serde::Serialize;

use super::{read_fully, write_fully};
use crate::csv_handler::CsvHeader;
use crate::error::{RawAccelError, Result};
use crate::ident::Identifier;
use crate::util::{format_epoch, payload_bytes, NUM_SIGNALS, SIZE_PER_SIGNAL};

/// Width of the firmware field, terminator included.
pub const FIRMWARE_FIELD_LEN: usize = 16;

/// Width of the serial-number field, terminator included.
pub const SERIAL_ID_FIELD_LEN: usize = 16;

/// Total encoded header size in bytes.
pub const HEADER_SIZE: usize = 4 + 8 + 8 + 8 + FIRMWARE_FIELD_LEN + SERIAL_ID_FIELD_LEN + 4 + 4 + 4;

const FIRMWARE_OFFSET: usize = 28;
const SERIAL_ID_OFFSET: usize = FIRMWARE_OFFSET + FIRMWARE_FIELD_LEN;
const COUNTS_OFFSET: usize = SERIAL_ID_OFFSET + SERIAL_ID_FIELD_LEN;

/// Device firmware version as stored in the header.
pub type Firmware = Identifier<FIRMWARE_FIELD_LEN>;

/// Device serial number as stored in the header.
pub type SerialId = Identifier<SERIAL_ID_FIELD_LEN>;

/// Metadata block at the start of a binary recording.
///
/// `sz_remaining` is the number of payload bytes that follow the header;
/// readers rely on it since the format carries no record count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinHeader {
    /// Samples per second.
    pub samplerate: u32,
    /// Recording start, local epoch seconds.
    pub start_time: i64,
    /// Recording stop, local epoch seconds.
    pub stop_time: i64,
    /// Recording length in seconds.
    pub duration_sec: f64,
    pub firmware: Firmware,
    pub serial_id: SerialId,
    /// Channels per sample, 3 for X/Y/Z.
    pub num_signals: u32,
    /// Bytes per channel value, 4 for `f32`.
    pub sz_per_signal: u32,
    /// Payload bytes following the header.
    pub sz_remaining: u32,
}

impl BinHeader {
    /// Derive a binary header from parsed CSV metadata.
    ///
    /// The payload size is `num_signals * sz_per_signal * sample_count`, where
    /// the sample count follows [`crate::util::sample_count`].
    pub fn from_csv_header(csv: &CsvHeader) -> Result<Self> {
        let bytes = payload_bytes(csv.duration_sec, csv.samplerate);
        let sz_remaining =
            u32::try_from(bytes).map_err(|_| RawAccelError::PayloadTooLarge { bytes })?;

        Ok(Self {
            samplerate: csv.samplerate,
            start_time: csv.start,
            stop_time: csv.stop,
            duration_sec: csv.duration_sec,
            firmware: csv.firmware.clone(),
            serial_id: csv.serial_id.clone(),
            num_signals: NUM_SIGNALS,
            sz_per_signal: SIZE_PER_SIGNAL,
            sz_remaining,
        })
    }

    /// Number of (X, Y, Z) records the payload holds.
    pub fn record_count(&self) -> u64 {
        let record_size = u64::from(self.num_signals) * u64::from(self.sz_per_signal);
        if record_size == 0 {
            return 0;
        }
        u64::from(self.sz_remaining) / record_size
    }

    /// Serialize header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(&self.samplerate.to_le_bytes());
        buf[4..12].copy_from_slice(&self.start_time.to_le_bytes());
        buf[12..20].copy_from_slice(&self.stop_time.to_le_bytes());
        buf[20..28].copy_from_slice(&self.duration_sec.to_le_bytes());
        buf[FIRMWARE_OFFSET..SERIAL_ID_OFFSET].copy_from_slice(&self.firmware.to_field());
        buf[SERIAL_ID_OFFSET..COUNTS_OFFSET].copy_from_slice(&self.serial_id.to_field());
        buf[COUNTS_OFFSET..COUNTS_OFFSET + 4].copy_from_slice(&self.num_signals.to_le_bytes());
        buf[COUNTS_OFFSET + 4..COUNTS_OFFSET + 8]
            .copy_from_slice(&self.sz_per_signal.to_le_bytes());
        buf[COUNTS_OFFSET + 8..HEADER_SIZE].copy_from_slice(&self.sz_remaining.to_le_bytes());

        buf
    }

    /// Deserialize header from bytes. Field contents are not validated.
    ///
    /// Identifier fields are decoded with [`Identifier::from_field`]: an
    /// unterminated field loses its last byte.
    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let u32_at = |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        let eight_at = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[at..at + 8]);
            b
        };

        let mut firmware = [0u8; FIRMWARE_FIELD_LEN];
        firmware.copy_from_slice(&buf[FIRMWARE_OFFSET..SERIAL_ID_OFFSET]);
        let mut serial_id = [0u8; SERIAL_ID_FIELD_LEN];
        serial_id.copy_from_slice(&buf[SERIAL_ID_OFFSET..COUNTS_OFFSET]);

        Self {
            samplerate: u32_at(0),
            start_time: i64::from_le_bytes(eight_at(4)),
            stop_time: i64::from_le_bytes(eight_at(12)),
            duration_sec: f64::from_le_bytes(eight_at(20)),
            firmware: Firmware::from_field(&firmware),
            serial_id: SerialId::from_field(&serial_id),
            num_signals: u32_at(COUNTS_OFFSET),
            sz_per_signal: u32_at(COUNTS_OFFSET + 4),
            sz_remaining: u32_at(COUNTS_OFFSET + 8),
        }
    }
}

impl fmt::Display for BinHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Binary Header")?;
        writeln!(f, "=============")?;
        writeln!(f, "  Serial number:     {:>24}", self.serial_id)?;
        writeln!(f, "  Firmware:          {:>24}", self.firmware)?;
        writeln!(f, "  Sample rate (Hz):  {:>24}", self.samplerate)?;
        writeln!(f, "  Start:             {:>24}", format_epoch(self.start_time))?;
        writeln!(f, "  Stop:              {:>24}", format_epoch(self.stop_time))?;
        writeln!(f, "  Duration (s):      {:>24.3}", self.duration_sec)?;
        writeln!(f, "  Signals:           {:>24}", self.num_signals)?;
        writeln!(f, "  Bytes per signal:  {:>24}", self.sz_per_signal)?;
        writeln!(f, "  Payload bytes:     {:>24}", self.sz_remaining)?;
        write!(f, "  Records:           {:>24}", self.record_count())
    }
}

/// Read the header from the start of `reader`.
///
/// The stream is rewound to offset 0 first; afterwards it is positioned at
/// the first payload byte.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<BinHeader> {
    reader.seek(SeekFrom::Start(0))?;

    let mut buf = [0u8; HEADER_SIZE];
    let read = read_fully(reader, &mut buf)?;
    if read < HEADER_SIZE {
        return Err(RawAccelError::TruncatedRead {
            expected: HEADER_SIZE as u64,
            actual: read as u64,
        });
    }

    Ok(BinHeader::from_bytes(&buf))
}

/// Write the header at the start of `writer`, overwriting any existing header.
pub fn write_header<W: Write + Seek>(writer: &mut W, header: &BinHeader) -> Result<()> {
    writer.seek(SeekFrom::Start(0))?;

    let written = write_fully(writer, &header.to_bytes())?;
    if written < HEADER_SIZE {
        return Err(RawAccelError::TruncatedWrite {
            expected: HEADER_SIZE as u64,
            actual: written as u64,
        });
    }
    Ok(())
}
