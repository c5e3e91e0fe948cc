//! Integration tests for loading binary files, including damaged ones

use std::fs::OpenOptions;
use std::io::Cursor;

use raw_accel::binary::{
    read_binary_file, read_binary_file_lenient, read_header, write_binary, write_header,
    BinHeader, Firmware, PayloadRead, SerialId, HEADER_SIZE,
};
use raw_accel::error::RawAccelError;
use tempfile::tempdir;

/// Helper: a header describing `records` records at 40 Hz
fn header_for(records: u32) -> BinHeader {
    BinHeader {
        samplerate: 40,
        start_time: 1_449_619_200,
        stop_time: 1_449_619_200 + i64::from(records / 40),
        duration_sec: f64::from(records) / 40.0,
        firmware: Firmware::try_new("1.5.0").unwrap(),
        serial_id: SerialId::try_new("MOS2B21140207").unwrap(),
        num_signals: 3,
        sz_per_signal: 4,
        sz_remaining: records * 12,
    }
}

fn samples_for(records: u32) -> Vec<f32> {
    (0..records * 3).map(|i| i as f32 * 0.5).collect()
}

#[test]
fn test_truncated_payload_reports_and_exposes_bytes() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("cut.bin");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write_binary(&mut file, &header_for(80), &samples_for(80)).unwrap();
    }
    // Cut the file mid-payload, halfway through a float
    let cut_len = (HEADER_SIZE + 100 * 4 + 2) as u64;
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(cut_len)
        .unwrap();

    let err = read_binary_file(&path).unwrap_err();
    assert!(matches!(
        err,
        RawAccelError::TruncatedRead {
            expected: 960,
            actual: 402
        }
    ));

    let (header, payload) = read_binary_file_lenient(&path).unwrap();
    assert_eq!(header.sz_remaining, 960);
    match payload {
        PayloadRead::Truncated(partial) => {
            assert_eq!(partial.bytes.len(), 402);
            let samples = partial.samples();
            assert_eq!(samples.len(), 100);
            assert_eq!(samples[..], samples_for(80)[..100]);
        }
        PayloadRead::Complete(_) => panic!("payload should be truncated"),
    }
}

#[test]
fn test_header_only_file_with_empty_payload() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("empty.bin");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write_binary(&mut file, &header_for(0), &[]).unwrap();
    }
    let recording = read_binary_file(&path).unwrap();
    assert_eq!(recording.record_count(), 0);
    assert_eq!(recording.header.record_count(), 0);
}

#[test]
fn test_header_rewrite_in_place_keeps_payload() {
    let mut cursor = Cursor::new(Vec::new());
    write_binary(&mut cursor, &header_for(40), &samples_for(40)).unwrap();

    let mut updated = header_for(40);
    updated.serial_id = SerialId::try_new("RENAMED").unwrap();
    write_header(&mut cursor, &updated).unwrap();

    let data = cursor.into_inner();
    assert_eq!(data.len(), HEADER_SIZE + 40 * 12);
    let read = read_header(&mut Cursor::new(data)).unwrap();
    assert_eq!(read.serial_id.as_str(), "RENAMED");
}

#[test]
fn test_payload_mismatch_is_rejected() {
    let mut cursor = Cursor::new(Vec::new());
    let err = write_binary(&mut cursor, &header_for(40), &samples_for(39)).unwrap_err();
    assert!(matches!(err, RawAccelError::PayloadMismatch { .. }));
}

#[test]
fn test_missing_file_is_not_found() {
    let temp_dir = tempdir().unwrap();
    let err = read_binary_file(&temp_dir.path().join("none.bin")).unwrap_err();
    assert!(matches!(err, RawAccelError::NotFound { .. }));
}
