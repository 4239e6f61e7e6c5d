// EAT day keys, hour buckets and ISO formatting

use chrono::{TimeZone, Timelike, Utc};
use mpesa_dashboard::core::timezone::{
    day_key, format_iso8601, local_end_of_day, local_hour, local_midnight, to_local,
};
use mpesa_dashboard::core::RawTimestamp;
use serde_json::json;

#[test]
fn test_late_utc_evening_is_next_eat_day() {
    // 21:30 UTC is 00:30 EAT the next day
    let utc_time = Utc.with_ymd_and_hms(2026, 2, 20, 21, 30, 0).unwrap();
    assert_eq!(day_key(utc_time), "2026-02-21");
    assert_eq!(local_hour(utc_time), 0);
}

#[test]
fn test_eat_is_three_hours_ahead() {
    let utc_time = Utc.with_ymd_and_hms(2026, 2, 21, 10, 0, 0).unwrap();
    let local = to_local(utc_time);
    assert_eq!(local.hour(), 13);
    assert_eq!(local.offset().local_minus_utc(), 3 * 3600);
}

#[test]
fn test_local_day_bounds() {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();
    let midnight = local_midnight(date).unwrap();
    let end = local_end_of_day(date).unwrap();

    assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 2, 20, 21, 0, 0).unwrap());
    assert_eq!(day_key(midnight), "2026-02-21");
    assert_eq!(day_key(end), "2026-02-21");
    assert!(end > midnight);
}

#[test]
fn test_iso8601_formatting() {
    let utc_time = Utc.with_ymd_and_hms(2025, 11, 3, 10, 30, 45).unwrap();
    assert_eq!(format_iso8601(utc_time), "2025-11-03T10:30:45.000Z");
}

#[test]
fn test_every_timestamp_shape_lands_on_the_same_instant() {
    let expected = Utc.with_ymd_and_hms(2026, 2, 21, 7, 15, 0).unwrap();

    let shapes = vec![
        RawTimestamp::Native(expected),
        RawTimestamp::Iso("2026-02-21T07:15:00Z".to_string()),
        RawTimestamp::Iso("2026-02-21T10:15:00+03:00".to_string()),
        RawTimestamp::from_json(&json!({"_seconds": expected.timestamp(), "_nanoseconds": 0})),
        RawTimestamp::from_json(&json!({"seconds": expected.timestamp(), "nanoseconds": 0})),
    ];

    for shape in shapes {
        assert_eq!(shape.normalize(), Some(expected), "{:?}", shape);
    }
}

#[test]
fn test_unrecognized_shapes_do_not_normalize() {
    assert_eq!(RawTimestamp::from_json(&json!({"when": 5})).normalize(), None);
    assert_eq!(RawTimestamp::from_json(&json!(null)).normalize(), None);
    assert_eq!(RawTimestamp::Iso("yesterday".to_string()).normalize(), None);
}
