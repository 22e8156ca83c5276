//! Time handling utilities for monitor readings.

use chrono::{DateTime, DurationRound, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc};

use crate::error::{AqhiError, AqhiResult};

/// Naive layouts accepted after RFC 3339 fails. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a reading timestamp.
///
/// Supports RFC 3339 with any offset (normalised to UTC), naive date-times
/// with `T` or space separators, and bare dates.
///
/// The station feed publishes `ReadingDate` in UTC, so a value without an
/// offset is taken as UTC wall-clock time and is written back with a `Z`
/// suffix by [`format_timestamp`]. Feeds in local time must carry an offset.
pub fn parse_timestamp(s: &str) -> AqhiResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Offsets without a colon, e.g. "2024-07-01 14:00:00-0600"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(AqhiError::InvalidTime(s.to_string()))
}

/// Truncate a timestamp down to the start of its containing hour.
pub fn truncate_to_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    // Only fails for spans wider than the timestamp range, never for one hour.
    dt.duration_trunc(TimeDelta::hours(1)).unwrap_or(dt)
}

/// Format a timestamp the way it is written into grid outputs.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-07-15T14:35:00-06:00").unwrap();
        assert_eq!(dt.hour(), 20);
        assert_eq!(dt.minute(), 35);
    }

    #[test]
    fn test_parse_naive_space_separated() {
        let dt = parse_timestamp("2024-07-15 14:35:10").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.second(), 10);
    }

    #[test]
    fn test_naive_timestamp_written_as_utc() {
        let dt = parse_timestamp("2024-07-15 14:00:00").unwrap();
        assert_eq!(format_timestamp(dt), "2024-07-15T14:00:00Z");

        let local = parse_timestamp("2024-07-15 14:00:00-0600").unwrap();
        assert_eq!(format_timestamp(local), "2024-07-15T20:00:00Z");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2024-07-15").unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AqhiError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_truncate_to_hour() {
        let dt = Utc.with_ymd_and_hms(2024, 7, 15, 14, 59, 59).unwrap();
        let hour = truncate_to_hour(dt);
        assert_eq!(hour, Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap());
        assert_eq!(truncate_to_hour(hour), hour);
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(dt), "2024-01-15T12:00:00Z");
    }
}
