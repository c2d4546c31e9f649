//! Fullmoon: lunar phase calculations in Rust
//!
//! This crate answers two questions about the Moon: does a given calendar date
//! contain a full moon, and when is the next full moon after a given instant.
//! Phase events are located with the classic mean-lunation polynomials and
//! periodic corrections, and the illumination of the disk is computed from
//! the epoch 1980.0 orbital elements of the Sun and Moon.
//!
//! # Examples
//!
//! ```no_run
//! use fullmoon::{FixedClock, MoonAlmanac};
//! use chrono::{TimeZone, Utc};
//!
//! let almanac = MoonAlmanac::new();
//! assert!(almanac.is_full_moon("2018-01-02").unwrap());
//!
//! let now = Utc.with_ymd_and_hms(2017, 12, 20, 15, 5, 0).unwrap();
//! let almanac = MoonAlmanac::new().with_clock(FixedClock::new(now));
//! assert_eq!(almanac.next_full_moon().unwrap(), 1514864066);
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod almanac;
pub mod angle;
pub mod constants;
pub mod illumination;
pub mod kepler;
pub mod phase;
pub mod search;
pub mod time;

// Re-export commonly used types
pub use almanac::{AlmanacConfig, MoonAlmanac};
pub use constants::OrbitalElements;
pub use illumination::MoonDetail;
pub use phase::{CorrectionSeries, PhaseType};
pub use search::{LunationBracket, PhaseEvent, PhaseWindow};
pub use time::{Clock, FixedClock, SystemClock, TimeError};

/// Main error type for the fullmoon library
#[derive(Debug, Error)]
pub enum FullMoonError {
    #[error(transparent)]
    Time(#[from] TimeError),

    #[error("Kepler solver did not converge after {iterations} iterations (mean anomaly {mean_anomaly} deg, eccentricity {eccentricity})")]
    KeplerDivergence {
        iterations: usize,
        mean_anomaly: f64,
        eccentricity: f64,
    },

    #[error("Phase search gave up after {iterations} lunations starting at JD {start_jd}")]
    SearchExhausted { iterations: usize, start_jd: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for fullmoon operations
pub type Result<T> = std::result::Result<T, FullMoonError>;

/// Does the calendar date (midnight UTC) contain a full moon?
pub fn is_full_moon(date: &str) -> Result<bool> {
    MoonAlmanac::new().is_full_moon(date)
}

/// Unix seconds of the first full moon after the current system time
pub fn next_full_moon() -> Result<i64> {
    MoonAlmanac::new().next_full_moon()
}

/// Unix seconds of the first full moon after `from`
pub fn next_full_moon_from(from: DateTime<Utc>) -> Result<i64> {
    MoonAlmanac::new().next_full_moon_from(from)
}
