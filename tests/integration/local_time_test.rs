//! Integration tests for preamble instants around daylight-saving transitions
//!
//! These run in their own test binary because they pin the process time zone
//! through `TZ`, which every local-time conversion in the process observes.

use std::io::Cursor;

use raw_accel::csv_handler::parse_preamble;
use raw_accel::error::RawAccelError;

/// US Eastern rules as a POSIX TZ string, so no zoneinfo files are needed
const US_EASTERN: &str = "EST5EDT,M3.2.0,M11.1.0";

fn use_us_eastern() {
    std::env::set_var("TZ", US_EASTERN);
}

/// Helper: a preamble with the given start and download instants
fn preamble(start: (&str, &str), stop: (&str, &str)) -> String {
    format!(
        "------------ Data File Created By ActiGraph GT3X+ ActiLife v6.11.8 Firmware v1.5.0 date format M/d/yyyy at 40 Hz  Filter Normal -----------\n\
         Serial Number: MOS2B21140207\n\
         Start Time {}\n\
         Start Date {}\n\
         Epoch Period (hh:mm:ss) 00:00:00\n\
         Download Time {}\n\
         Download Date {}\n\
         Current Memory Address: 0\n\
         Current Battery Voltage: 3.93     Mode = 12\n\
         --------------------------------------------------\n\
         Timestamp,Accelerometer X,Accelerometer Y,Accelerometer Z\n",
        start.0, start.1, stop.0, stop.1
    )
}

#[test]
fn test_start_in_spring_forward_gap_is_format_error() {
    use_us_eastern();
    // 02:30 on 3/8/2015 never happens in US Eastern time
    let text = preamble(("02:30:00", "3/8/2015"), ("00:00:00", "3/9/2015"));
    let err = parse_preamble(&mut Cursor::new(text)).unwrap_err();
    match err {
        RawAccelError::Format { line, message } => {
            assert_eq!(line, 4);
            assert!(message.contains("does not exist in local time"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_ambiguous_fall_back_start_takes_earlier_instant() {
    use_us_eastern();
    // 01:30 on 11/1/2015 occurs twice; the EDT reading is 05:30 UTC
    let text = preamble(("01:30:00", "11/1/2015"), ("00:00:00", "11/2/2015"));
    let header = parse_preamble(&mut Cursor::new(text)).unwrap();
    assert_eq!(header.start, 1_446_355_800);
    // 22.5 wall-clock hours to midnight span 23.5 real hours
    assert_eq!(header.duration_sec, 23.5 * 3600.0);
}
