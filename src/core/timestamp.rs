//! Normalization of stored `createdAt` values.
//!
//! Records written over the life of the dashboard carry three different
//! timestamp shapes: epoch-second objects (`{"_seconds": .., "_nanoseconds": ..}`),
//! ISO-8601 strings and native datetimes. [`RawTimestamp`] names each shape
//! explicitly and [`RawTimestamp::normalize`] maps them to a single UTC instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

/// A stored timestamp in whichever shape it was persisted
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// Epoch seconds with optional sub-second nanos
    EpochSeconds { seconds: i64, nanos: u32 },
    /// ISO-8601 text
    Iso(String),
    /// Native datetime column
    Native(DateTime<Utc>),
    /// Anything else; never normalizes
    Unrecognized(Value),
}

impl RawTimestamp {
    /// Classify a JSON value into one of the known shapes
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) => RawTimestamp::Iso(text.clone()),
            Value::Object(map) => {
                let seconds = map
                    .get("_seconds")
                    .or_else(|| map.get("seconds"))
                    .and_then(Value::as_i64);
                let nanos = map
                    .get("_nanoseconds")
                    .or_else(|| map.get("nanoseconds"))
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0);

                match seconds {
                    Some(seconds) => RawTimestamp::EpochSeconds { seconds, nanos },
                    None => RawTimestamp::Unrecognized(value.clone()),
                }
            }
            other => RawTimestamp::Unrecognized(other.clone()),
        }
    }

    /// Convert to a UTC instant, or `None` when the shape cannot be read.
    ///
    /// Callers skip records that return `None`.
    pub fn normalize(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::EpochSeconds { seconds, nanos } => {
                DateTime::from_timestamp(*seconds, *nanos)
            }
            RawTimestamp::Iso(text) => parse_iso(text),
            RawTimestamp::Native(instant) => Some(*instant),
            RawTimestamp::Unrecognized(_) => None,
        }
    }

    /// JSON shape used when persisting this timestamp
    pub fn to_json(&self) -> Value {
        match self {
            RawTimestamp::EpochSeconds { seconds, nanos } => serde_json::json!({
                "_seconds": seconds,
                "_nanoseconds": nanos,
            }),
            RawTimestamp::Iso(text) => Value::String(text.clone()),
            RawTimestamp::Native(instant) => Value::String(instant.to_rfc3339()),
            RawTimestamp::Unrecognized(value) => value.clone(),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        RawTimestamp::Native(instant)
    }
}

fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Offset-less values are read as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    None
}
