//! Timestamp normalization and seed-calendar date arithmetic.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::StoreError;

pub(crate) const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a datetime in the store's text format.
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FMT).to_string()
}

/// Parses a timestamp argument into the store's text format.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated variant (with or
/// without fractional seconds), or a bare `YYYY-MM-DD`, which becomes
/// midnight. Anything else is an [`StoreError::InvalidTimestamp`].
pub fn normalize_timestamp(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(format_timestamp(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(format_timestamp(date.and_time(NaiveTime::MIN)));
    }
    Err(StoreError::InvalidTimestamp(raw.to_string()))
}

/// Midnight on the given weekday of an upcoming week.
///
/// `weeks_ahead = 1` means next week's occurrence counted from the Monday
/// of the current week, matching how the seed calendar anchors its offsite
/// and party fixtures.
pub fn upcoming_weekday(now: NaiveDateTime, weekday: Weekday, weeks_ahead: i64) -> NaiveDateTime {
    let today = now.date();
    let offset = weekday.num_days_from_monday() as i64 + 7 * weeks_ahead
        - today.weekday().num_days_from_monday() as i64;
    (today + Duration::days(offset)).and_time(NaiveTime::MIN)
}
