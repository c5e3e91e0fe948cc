use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::header::{read_header, BinHeader};
use crate::error::{RawAccelError, Result};

/// Outcome of reading the payload that follows a header.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadRead {
    /// All `sz_remaining` bytes were read.
    Complete(Vec<f32>),
    /// The stream ended early. The bytes read so far are kept.
    Truncated(TruncatedPayload),
}

impl PayloadRead {
    /// Returns the samples, or [`RawAccelError::TruncatedRead`] if the payload was short.
    pub fn into_result(self) -> Result<Vec<f32>> {
        match self {
            PayloadRead::Complete(samples) => Ok(samples),
            PayloadRead::Truncated(partial) => Err(partial.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PayloadRead::Complete(_))
    }
}

/// A payload that ended before the size declared in its header.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedPayload {
    /// Bytes the header declared.
    pub expected: u64,
    /// Bytes actually present, possibly ending mid-float.
    pub bytes: Vec<u8>,
}

impl TruncatedPayload {
    /// Decodes every complete float in the partial payload.
    pub fn samples(&self) -> Vec<f32> {
        decode_samples(&self.bytes)
    }
}

impl From<TruncatedPayload> for RawAccelError {
    fn from(partial: TruncatedPayload) -> Self {
        RawAccelError::TruncatedRead {
            expected: partial.expected,
            actual: partial.bytes.len() as u64,
        }
    }
}

/// A binary file loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRecording {
    pub header: BinHeader,
    /// Interleaved X, Y, Z values.
    pub samples: Vec<f32>,
}

impl BinaryRecording {
    /// Number of complete (X, Y, Z) records loaded.
    pub fn record_count(&self) -> usize {
        self.samples.len() / 3
    }
}

/// Read `header.sz_remaining` payload bytes from the current stream position.
///
/// The buffer is sized from the header before reading. A short stream is not
/// an `Err`: it yields [`PayloadRead::Truncated`] holding whatever was read.
pub fn load_payload<R: Read>(reader: &mut R, header: &BinHeader) -> Result<PayloadRead> {
    let expected = u64::from(header.sz_remaining);

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(header.sz_remaining as usize)
        .map_err(|_| RawAccelError::Allocation { bytes: expected })?;
    reader.take(expected).read_to_end(&mut bytes)?;

    if (bytes.len() as u64) < expected {
        return Ok(PayloadRead::Truncated(TruncatedPayload { expected, bytes }));
    }
    Ok(PayloadRead::Complete(decode_samples(&bytes)))
}

/// Open a binary file and read its header and payload, keeping partial payloads.
pub fn read_binary_file_lenient(path: &Path) -> Result<(BinHeader, PayloadRead)> {
    tracing::info!("Opening {} for reading", path.display());
    let file = File::open(path).map_err(|e| RawAccelError::from_open(path, e))?;
    let mut reader = BufReader::new(file);

    let header = read_header(&mut reader).map_err(|e| {
        tracing::error!("Could not parse header information from {}", path.display());
        e
    })?;
    tracing::debug!(
        samplerate = header.samplerate,
        sz_remaining = header.sz_remaining,
        "Read binary header"
    );

    let payload = load_payload(&mut reader, &header)?;
    if let PayloadRead::Truncated(ref partial) = payload {
        tracing::warn!(
            "Expected number of records not found! {} may be corrupted ({} of {} bytes)",
            path.display(),
            partial.bytes.len(),
            partial.expected
        );
    }
    Ok((header, payload))
}

/// Open a binary file and read it completely.
///
/// A payload shorter than the header declares is a
/// [`RawAccelError::TruncatedRead`].
pub fn read_binary_file(path: &Path) -> Result<BinaryRecording> {
    let (header, payload) = read_binary_file_lenient(path)?;
    let samples = payload.into_result()?;
    Ok(BinaryRecording { header, samples })
}

fn decode_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
