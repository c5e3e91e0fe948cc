//! Binary container module
//!
//! Reads and writes the compact binary format: a fixed 72-byte header
//! followed by `sz_remaining` bytes of interleaved little-endian `f32`
//! samples (X, Y, Z repeating).

pub mod header;
pub mod reader;
pub mod writer;

use std::io::{ErrorKind, Read, Write};

pub use header::{read_header, write_header, BinHeader, Firmware, SerialId, HEADER_SIZE};
pub use reader::{
    load_payload, read_binary_file, read_binary_file_lenient, BinaryRecording, PayloadRead,
    TruncatedPayload,
};
pub use writer::{encode_samples, write_binary};

/// Reads until `buf` is full or the stream ends, returning the bytes read.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes until `buf` is consumed or the sink stops accepting bytes.
fn write_fully<W: Write>(writer: &mut W, buf: &[u8]) -> std::io::Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
