//! Common types used across the platform

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Date range for queries (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` calendar days ending on (and including) `end`
    pub fn trailing_days(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: end - Duration::days(span),
            end,
        }
    }

    /// Half-open instant window `[start_of_day(start), start_of_day(end + 1))`
    pub fn to_window(&self, offset: FixedOffset) -> DayWindow {
        DayWindow {
            start: start_of_day(self.start, offset),
            end: start_of_day(self.end + Duration::days(1), offset),
        }
    }
}

/// Half-open interval of instants covering whole calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The window covering a single calendar day
    pub fn for_day(date: NaiveDate, offset: FixedOffset) -> Self {
        DateRange {
            start: date,
            end: date,
        }
        .to_window(offset)
    }
}

/// Start of `date` in the reference `offset`, expressed as a UTC instant.
///
/// Every stored sale date and every per-day query boundary goes through this
/// function so aggregation never depends on the server's local timezone.
pub fn start_of_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    // A fixed offset has no gaps or folds, so the mapping is always single.
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Calendar date of `instant` as seen from `offset`
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Parse a `YYYY-MM-DD` date string
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}
