use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// East Africa Time offset in seconds (UTC+3, no DST).
///
/// Every calendar-day and hour-of-day computation in the dashboard uses this
/// single fixed offset. It is only correct for the EAT market.
pub const EAT_OFFSET_SECS: i32 = 3 * 3600;

/// Format of a calendar-day key, e.g. `2026-02-21`
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// The fixed EAT offset
pub fn eat() -> FixedOffset {
    FixedOffset::east_opt(EAT_OFFSET_SECS).expect("Valid offset")
}

/// Convert a UTC instant to the EAT wall clock
pub fn to_local(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&eat())
}

/// Calendar date of an instant in EAT
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant
        .checked_add_signed(Duration::seconds(EAT_OFFSET_SECS as i64))
        .map_or_else(|| instant.date_naive(), |shifted| shifted.date_naive())
}

/// Calendar-day key (`YYYY-MM-DD`) of an instant in EAT.
///
/// Shifts the instant by +3h and takes the UTC calendar date.
pub fn day_key(instant: DateTime<Utc>) -> String {
    local_date(instant).format(DAY_KEY_FORMAT).to_string()
}

/// Format a calendar date as a day key
pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Hour of day (0-23) of an instant in EAT
pub fn local_hour(instant: DateTime<Utc>) -> u32 {
    to_local(instant).hour()
}

/// The UTC instant of EAT midnight on the given calendar date.
///
/// `None` when the instant falls outside the representable range, which
/// only happens for dates at the far ends of chrono's calendar.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&naive).checked_sub_signed(Duration::seconds(EAT_OFFSET_SECS as i64))
}

/// The UTC instant of the last millisecond of the given EAT calendar date
pub fn local_end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    local_midnight(date)?.checked_add_signed(Duration::days(1) - Duration::milliseconds(1))
}

/// Format timestamp as ISO 8601 UTC with millisecond precision for API responses
pub fn format_iso8601(utc_time: DateTime<Utc>) -> String {
    utc_time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
