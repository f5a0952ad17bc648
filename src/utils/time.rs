//! Time and calendar-day utilities
//!
//! Store timestamps are unix seconds. Calendar days are taken in UTC.

use chrono::{DateTime, NaiveDate, NaiveTime};

/// Calendar day (UTC) of a unix timestamp in seconds
pub fn unix_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// Unix timestamp of midnight UTC on `date`
pub fn date_to_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Parse a timestamp cell from an import file
///
/// Accepts plain unix seconds, `YYYY-MM-DD`, or RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return Some(secs);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date_to_unix(date));
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.timestamp())
}

/// Inclusive number of calendar days from `first` to `last`
pub fn inclusive_days(first: NaiveDate, last: NaiveDate) -> i64 {
    (last - first).num_days() + 1
}
