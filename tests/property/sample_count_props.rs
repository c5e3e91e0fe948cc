//! Property-based tests for the duration to sample-count rounding policy
//!
//! A duration recovered from a row count must map back to exactly that row
//! count, and the binary header must carry the matching payload size.

use proptest::prelude::*;

use raw_accel::binary::{BinHeader, Firmware, SerialId, HEADER_SIZE};
use raw_accel::util::{payload_bytes, sample_count, NUM_SIGNALS, SIZE_PER_SIGNAL};

/// Strategy for sample rates a device can be configured with
fn samplerate_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(30u32),
        Just(40u32),
        Just(50u32),
        Just(80u32),
        Just(100u32),
        1u32..=1000,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn recovered_duration_maps_back_to_row_count(
        rows in 0u64..20_000_000,
        rate in samplerate_strategy(),
    ) {
        let duration = rows as f64 / f64::from(rate);
        prop_assert_eq!(sample_count(duration, rate), rows);
    }

    #[test]
    fn whole_second_durations_are_exact(secs in 0u32..1_000_000, rate in samplerate_strategy()) {
        prop_assert_eq!(
            sample_count(f64::from(secs), rate),
            u64::from(secs) * u64::from(rate)
        );
    }

    #[test]
    fn payload_is_twelve_bytes_per_sample(duration in 0.0f64..100_000.0, rate in samplerate_strategy()) {
        let per_sample = u64::from(NUM_SIGNALS) * u64::from(SIZE_PER_SIGNAL);
        prop_assert_eq!(per_sample, 12);
        prop_assert_eq!(payload_bytes(duration, rate), per_sample * sample_count(duration, rate));
    }

    #[test]
    fn sample_count_never_exceeds_product(duration in 0.0f64..100_000.0, rate in samplerate_strategy()) {
        let count = sample_count(duration, rate) as f64;
        prop_assert!(count <= duration * f64::from(rate) + 1e-6);
    }

    #[test]
    fn header_bytes_keep_payload_size(
        rows in 0u32..10_000_000,
        rate in samplerate_strategy(),
        start in 0i64..2_000_000_000,
    ) {
        let duration = f64::from(rows) / f64::from(rate);
        let header = BinHeader {
            samplerate: rate,
            start_time: start,
            stop_time: start + duration.trunc() as i64,
            duration_sec: duration,
            firmware: Firmware::try_new("1.5.0").unwrap(),
            serial_id: SerialId::try_new("MOS2B21140207").unwrap(),
            num_signals: NUM_SIGNALS,
            sz_per_signal: SIZE_PER_SIGNAL,
            sz_remaining: payload_bytes(duration, rate) as u32,
        };
        let bytes = header.to_bytes();
        prop_assert_eq!(bytes.len(), HEADER_SIZE);
        let decoded = BinHeader::from_bytes(&bytes);
        prop_assert_eq!(decoded.sz_remaining, rows * 12);
        prop_assert_eq!(decoded.record_count(), u64::from(rows));
        prop_assert_eq!(decoded.duration_sec.to_bits(), duration.to_bits());
    }
}
