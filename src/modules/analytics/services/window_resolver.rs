use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

use crate::core::timezone::{format_day_key, local_date, local_end_of_day, local_midnight};
use crate::core::{AppError, RawTimestamp, Result};
use crate::modules::analytics::models::{Period, ReportingWindow};

/// Resolve a named period into concrete bounds and the day keys it spans.
///
/// Non-custom windows end at `now` and start at EAT midnight of the first day.
/// `custom` uses the caller's bounds; a bare `YYYY-MM-DD` start means EAT
/// midnight and a bare end date means the last millisecond of that EAT day.
/// `all` has no lower bound and no day keys until anchored with
/// [`anchor_unbounded`]. Windows spanning more than `max_days` EAT days are
/// rejected before any day key is built.
pub fn resolve(
    period: Period,
    now: DateTime<Utc>,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    max_days: u32,
) -> Result<ReportingWindow> {
    let today = local_date(now);

    let (start, end) = match period {
        Period::Today => (Some(midnight_of(today)?), now),
        Period::Week => (Some(midnight_of(today - Duration::days(7))?), now),
        Period::Month => (Some(midnight_of(today - Duration::days(30))?), now),
        Period::Year => {
            let year_ago = today
                .checked_sub_months(Months::new(12))
                .ok_or_else(|| AppError::invalid_window("Year window out of range"))?;
            (Some(midnight_of(year_ago)?), now)
        }
        Period::Custom => {
            let (start_text, end_text) = match (custom_start, custom_end) {
                (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => (s, e),
                _ => {
                    return Err(AppError::invalid_window(
                        "custom period requires both startDate and endDate",
                    ))
                }
            };
            let start = parse_boundary(start_text, Boundary::Start)?;
            let end = parse_boundary(end_text, Boundary::End)?;
            (Some(start), end)
        }
        Period::All => (None, now),
    };

    let day_keys = match start {
        Some(start) => {
            if start > end {
                return Err(AppError::invalid_window(format!(
                    "start ({}) must be before or equal to end ({})",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                )));
            }
            let span = span_days(local_date(start), local_date(end));
            if span > i64::from(max_days) {
                return Err(AppError::invalid_window(format!(
                    "Window spans {} days; the maximum is {}",
                    span, max_days
                )));
            }
            day_keys_between(start, end)
        }
        None => Vec::new(),
    };

    Ok(ReportingWindow {
        period,
        start,
        end,
        day_keys,
    })
}

/// Give an unbounded (`all`) window day keys from the earliest known record
/// to its end, keeping at most the last `max_days` days. Windows with a lower
/// bound are returned unchanged.
pub fn anchor_unbounded(
    window: ReportingWindow,
    earliest: Option<DateTime<Utc>>,
    max_days: u32,
) -> ReportingWindow {
    if window.start.is_some() {
        return window;
    }

    let last_day = local_date(window.end);
    let first_day = earliest
        .filter(|at| *at <= window.end)
        .map(local_date)
        .unwrap_or(last_day);
    let oldest_allowed = last_day
        .checked_sub_signed(Duration::days(i64::from(max_days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN);

    ReportingWindow {
        day_keys: dates_between(first_day.max(oldest_allowed), last_day)
            .into_iter()
            .map(format_day_key)
            .collect(),
        ..window
    }
}

/// Inclusive list of EAT day keys from `start` to `end`
pub fn day_keys_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
    dates_between(local_date(start), local_date(end))
        .into_iter()
        .map(format_day_key)
        .collect()
}

fn dates_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first.iter_days().take_while(|day| *day <= last).collect()
}

fn span_days(first: NaiveDate, last: NaiveDate) -> i64 {
    (last - first).num_days() + 1
}

fn midnight_of(date: NaiveDate) -> Result<DateTime<Utc>> {
    local_midnight(date)
        .ok_or_else(|| AppError::invalid_window(format!("Date out of range: {}", date)))
}

#[derive(Debug, Clone, Copy)]
enum Boundary {
    Start,
    End,
}

fn parse_boundary(text: &str, boundary: Boundary) -> Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let bound = match boundary {
            Boundary::Start => local_midnight(date),
            Boundary::End => local_end_of_day(date),
        };
        return bound
            .ok_or_else(|| AppError::invalid_window(format!("Date out of range: '{}'", text)));
    }

    RawTimestamp::Iso(text.to_string())
        .normalize()
        .ok_or_else(|| AppError::invalid_window(format!("Unreadable date: '{}'", text)))
}
