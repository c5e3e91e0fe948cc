//! Property-based tests for preamble line extraction

use proptest::prelude::*;

use raw_accel::csv_handler::PreambleParser;

/// Strategy for dotted firmware versions
fn firmware_strategy() -> impl Strategy<Value = String> {
    (0u8..20, 0u8..20, 0u8..20).prop_map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
}

/// Strategy for device serial numbers
fn serial_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9A-Z]{1,12}".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn banner_yields_firmware_and_rate(firmware in firmware_strategy(), rate in 1u32..=10_000) {
        let parser = PreambleParser::new().unwrap();
        let line = format!(
            "------------ Data File Created By ActiGraph GT3X+ ActiLife v6.11.8 Firmware v{} date format M/d/yyyy at {} Hz  Filter Normal -----------",
            firmware, rate
        );
        prop_assert_eq!(parser.extract_banner(&line), Some((firmware, rate)));
    }

    #[test]
    fn serial_line_yields_serial(serial in serial_strategy()) {
        let parser = PreambleParser::new().unwrap();
        let line = format!("Serial Number: {}", serial);
        prop_assert_eq!(parser.extract_serial(&line), Some(serial));
    }

    #[test]
    fn banner_without_rate_is_rejected(firmware in firmware_strategy()) {
        let parser = PreambleParser::new().unwrap();
        let line = format!("Data File Created By ActiLife Firmware v{} date format M/d/yyyy", firmware);
        prop_assert_eq!(parser.extract_banner(&line), None);
    }

    #[test]
    fn start_time_line_yields_time(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
        let parser = PreambleParser::new().unwrap();
        let line = format!("Start Time {:02}:{:02}:{:02}", h, m, s);
        let time = parser.extract_start_time(&line).unwrap();
        prop_assert_eq!(time, chrono::NaiveTime::from_hms_opt(h, m, s).unwrap());
    }
}
