//! Encodings of time and date-time values.

use chrono::{DateTime, NaiveTime, Timelike, Utc};

/// Encoded missing time of day.
pub const MISSING_TIME: i64 = i64::MAX;

/// Encoded missing date-time seconds.
pub const MISSING_SECONDS: i64 = i64::MAX;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Encodes a time of day as nanoseconds since midnight.
#[must_use]
pub fn encode_time(time: Option<NaiveTime>) -> i64 {
    time.map_or(MISSING_TIME, |t| {
        i64::from(t.num_seconds_from_midnight()) * NANOS_PER_SECOND + i64::from(t.nanosecond())
    })
}

/// Decodes nanoseconds since midnight.
#[must_use]
pub fn decode_time(nanos: i64) -> Option<NaiveTime> {
    if nanos == MISSING_TIME || nanos < 0 {
        return None;
    }
    let seconds = u32::try_from(nanos / NANOS_PER_SECOND).ok()?;
    let fraction = (nanos % NANOS_PER_SECOND) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, fraction)
}

/// Encodes an instant as epoch seconds and nanoseconds.
#[must_use]
pub fn encode_date_time(value: Option<DateTime<Utc>>) -> (i64, u32) {
    value.map_or((MISSING_SECONDS, 0), |v| {
        (v.timestamp(), v.timestamp_subsec_nanos())
    })
}

/// Decodes epoch seconds and nanoseconds.
#[must_use]
pub fn decode_date_time(seconds: i64, nanos: u32) -> Option<DateTime<Utc>> {
    if seconds == MISSING_SECONDS {
        return None;
    }
    DateTime::from_timestamp(seconds, nanos)
}
