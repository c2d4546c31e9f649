//! Time module for lunar phase calculations
//!
//! This module provides the conversions between Unix seconds, Julian dates
//! and calendar dates that the phase search is built on, plus parsing of
//! caller supplied date strings and a small clock abstraction so that
//! "now" relative queries can be pinned in tests.

use crate::constants::{DAY_S, GREGORIAN_START, UNIX_EPOCH_JD};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid date: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Date-time layouts accepted by [`parse_date`] besides RFC 3339
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y%m%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts accepted by [`parse_date`], resolved to midnight UTC
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Calendar date with the day carrying the fraction of the day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: f64,
}

impl CalendarDate {
    /// Year plus the elapsed fraction of the year counted in whole months
    pub fn fractional_year(&self) -> f64 {
        self.year as f64 + (self.month as f64 - 1.0) / 12.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:09.6}", self.year, self.month, self.day)
    }
}

/// Convert seconds since the Unix epoch to a Julian date
pub fn julian_date(unix_seconds: f64) -> f64 {
    unix_seconds / DAY_S + UNIX_EPOCH_JD
}

/// Convert a Julian date to seconds since the Unix epoch
pub fn unix_seconds(julian_date: f64) -> f64 {
    (julian_date - UNIX_EPOCH_JD) * DAY_S
}

/// Convert a Julian date to a calendar date
///
/// Dates before JD 2299161 (1582-10-15) are expressed in the Julian
/// calendar, later ones in the Gregorian calendar. See Meeus, Astronomical
/// Algorithms, chapter 7.
pub fn calendar_date(julian_date: f64) -> CalendarDate {
    let jd = julian_date + 0.5;
    let z = jd.floor();
    let f = jd - z;

    let a = if z < GREGORIAN_START {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };

    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    CalendarDate {
        year: year as i32,
        month: month as u32,
        day,
    }
}

/// Seconds since the Unix epoch for a UTC datetime, including sub-second part
pub fn datetime_to_unix_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1_000_000_000.0
}

/// Julian date of a UTC datetime
pub fn datetime_to_julian_date(dt: &DateTime<Utc>) -> f64 {
    julian_date(datetime_to_unix_seconds(dt))
}

/// Convert whole Unix seconds back into a UTC datetime
pub fn unix_seconds_to_datetime(seconds: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| TimeError::OutOfRange(format!("{} seconds since the Unix epoch", seconds)))
}

/// Parse a caller supplied date or date-time string as UTC
///
/// Bare calendar dates resolve to midnight at the start of that day.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeError::InvalidFormat("empty date string".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| TimeError::OutOfRange(trimmed.to_string()))?;
            return Ok(midnight.and_utc());
        }
    }

    Err(TimeError::InvalidFormat(format!("'{}'", trimmed)))
}

/// Source of the current instant
pub trait Clock {
    /// The current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock that always reports `instant`
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
