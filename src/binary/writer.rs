use std::io::{Seek, Write};

use super::header::{write_header, BinHeader};
use super::write_fully;
use crate::error::{RawAccelError, Result};

/// Encodes samples as consecutive little-endian `f32` bytes.
pub fn encode_samples(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Write `header` at the start of `writer`, followed by the sample payload.
///
/// The payload must be exactly `header.sz_remaining` bytes long; otherwise
/// nothing is written and [`RawAccelError::PayloadMismatch`] is returned. A
/// zero-length payload is valid.
pub fn write_binary<W: Write + Seek>(
    writer: &mut W,
    header: &BinHeader,
    samples: &[f32],
) -> Result<()> {
    let payload = encode_samples(samples);
    let expected = u64::from(header.sz_remaining);
    if payload.len() as u64 != expected {
        return Err(RawAccelError::PayloadMismatch {
            header_bytes: expected,
            payload_bytes: payload.len() as u64,
        });
    }

    write_header(writer, header).map_err(|e| {
        tracing::error!("Incomplete streaming of binary file header");
        e
    })?;

    let written = write_fully(writer, &payload)?;
    if (written as u64) < expected {
        tracing::error!(
            "Incomplete streaming of binary data records (did not write all {} bytes)",
            expected
        );
        return Err(RawAccelError::TruncatedWrite {
            expected,
            actual: written as u64,
        });
    }
    writer.flush()?;

    tracing::info!("Finished streaming {} bytes of binary data", expected);
    Ok(())
}
