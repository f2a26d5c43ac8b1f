//! Timestamp parsing in a configured time zone
//!
//! The planning system emits ISO-8601 strings, usually without an offset.
//! Offset-less values are local wall-clock times in the zone the export runs
//! in, so every parse takes the target [`TimeZone`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::InputError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp as an instant in `tz`
///
/// Offset-less values are wall-clock times in `tz`; values with an explicit
/// offset are converted, so the result always carries `tz`'s offset.
/// Date-only values resolve to local midnight. When a wall-clock time is
/// ambiguous (DST fall-back) the earlier instant is used.
pub fn parse_instant<Tz: TimeZone>(
    value: &str,
    tz: &Tz,
) -> Result<DateTime<FixedOffset>, InputError> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(tz).fixed_offset());
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| InputError::InvalidTimestamp(value.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
        .ok_or_else(|| InputError::NonexistentLocalTime(value.to_string()))
}

/// Midnight at the start of `date` in `tz`, if that wall-clock time exists
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
}
