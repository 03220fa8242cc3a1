//! Timestamp parsing and calendar arithmetic for record dates.
//!
//! Records carry their dates as raw strings. Comparisons happen at full
//! timestamp precision; nothing is truncated to day boundaries.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};

/// Parse a record timestamp.
///
/// Accepted shapes, in order:
/// - RFC 3339 with an offset (`2024-03-20T18:30:00Z`, `2024-03-20T18:30:00+01:00`);
/// - naive date-time, read as UTC (`2024-03-20T18:30:00`, optional fraction);
/// - bare date, read as UTC midnight (`2024-03-20`).
///
/// Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Add `months` calendar months to `ts`.
///
/// The day of month is kept and overflows into the following month when
/// the target month is shorter: Jan 31 + 1 month is Mar 2 in 2024 and
/// Mar 3 in 2023. Time of day is preserved. Returns `None` when the result
/// is out of range.
pub fn add_months(ts: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let first = ts.date_naive().with_day(1)?;
    let target = first
        .checked_add_months(Months::new(months))?
        .checked_add_days(Days::new(u64::from(ts.day() - 1)))?;
    Some(target.and_time(ts.time()).and_utc())
}
