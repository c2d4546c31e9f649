//! Moon almanac: full moon queries
//!
//! [`MoonAlmanac`] ties the phase search and the illumination model together
//! to answer the questions callers actually ask: is there a full moon on this
//! date, and when is the next one.

pub mod config;

pub use config::AlmanacConfig;

use crate::illumination::{moon_detail, MoonDetail};
use crate::phase::{CorrectionSeries, PhaseType};
use crate::search::{PhaseSearch, PhaseWindow};
use crate::time::{datetime_to_unix_seconds, parse_date, Clock, SystemClock};
use crate::Result;
use chrono::{DateTime, Utc};

/// Lunar phase queries against a clock and configuration
#[derive(Debug, Clone)]
pub struct MoonAlmanac<C: Clock = SystemClock> {
    config: AlmanacConfig,
    clock: C,
}

impl MoonAlmanac<SystemClock> {
    /// Create an almanac with default settings and the system clock
    pub fn new() -> Self {
        Self {
            config: AlmanacConfig::default(),
            clock: SystemClock,
        }
    }
}

impl Default for MoonAlmanac<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MoonAlmanac<C> {
    /// Replace the clock used for "now" relative queries
    pub fn with_clock<D: Clock>(self, clock: D) -> MoonAlmanac<D> {
        MoonAlmanac {
            config: self.config,
            clock,
        }
    }

    /// Replace the configuration after checking it with [`AlmanacConfig::validate`]
    pub fn with_config(mut self, config: AlmanacConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Select the periodic correction series for phase dates
    pub fn with_correction_series(mut self, series: CorrectionSeries) -> Self {
        self.config.correction_series = series;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &AlmanacConfig {
        &self.config
    }

    fn search(&self) -> PhaseSearch {
        PhaseSearch::new(self.config.correction_series)
            .with_window_half_width_hours(self.config.window_half_width_hours)
            .with_max_iterations(self.config.max_search_iterations)
    }

    /// Does the calendar date contain a full moon?
    ///
    /// The date string is read as midnight UTC of that day and the search
    /// covers twelve hours either side of it.
    pub fn is_full_moon(&self, date: &str) -> Result<bool> {
        let instant = parse_date(date)?;
        self.is_full_moon_at(instant)
    }

    /// Is a full moon within the search window around `instant`?
    ///
    /// Every phase event in the window is checked against the illumination
    /// model; the first one whose disk is fully lit answers yes.
    pub fn is_full_moon_at(&self, instant: DateTime<Utc>) -> Result<bool> {
        let window = self
            .search()
            .enumerate_phases_in_window(datetime_to_unix_seconds(&instant))?;

        for event in &window.events {
            let detail = moon_detail(event.unix_seconds, &self.config.elements)?;
            log::debug!(
                "{} at JD {:.5}: illuminated fraction {:.5}",
                event.phase,
                event.julian_date,
                detail.illuminated_fraction
            );
            if detail.is_full() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Unix seconds of the next full moon after the clock's current time
    pub fn next_full_moon(&self) -> Result<i64> {
        self.next_full_moon_from(self.clock.now())
    }

    /// Unix seconds of the next full moon after `from`
    pub fn next_full_moon_from(&self, from: DateTime<Utc>) -> Result<i64> {
        self.next_phase_from(from, PhaseType::Full)
    }

    /// Unix seconds of the next occurrence of `phase` after `from`
    pub fn next_phase_from(&self, from: DateTime<Utc>, phase: PhaseType) -> Result<i64> {
        let event = self
            .search()
            .next_phase(datetime_to_unix_seconds(&from), phase)?;
        Ok(event.unix_seconds.floor() as i64)
    }

    /// Phase events within the search window around the date (midnight UTC)
    pub fn phases_on(&self, date: &str) -> Result<PhaseWindow> {
        let instant = parse_date(date)?;
        self.search()
            .enumerate_phases_in_window(datetime_to_unix_seconds(&instant))
    }

    /// Illumination and position of the Moon at `instant`
    pub fn moon_detail_at(&self, instant: DateTime<Utc>) -> Result<MoonDetail> {
        moon_detail(datetime_to_unix_seconds(&instant), &self.config.elements)
    }

    /// Illumination and position of the Moon at the clock's current time
    pub fn moon_detail_now(&self) -> Result<MoonDetail> {
        self.moon_detail_at(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use crate::FullMoonError;
    use chrono::TimeZone;
    use rstest::rstest;

    fn frozen(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> MoonAlmanac<FixedClock> {
        let now = Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap();
        MoonAlmanac::new().with_clock(FixedClock::new(now))
    }

    #[rstest]
    #[case("2018-01-02", true)]
    #[case("2018-01-01", false)]
    #[case("2018-01-03", false)]
    #[case("2018-01-24", false)] // first quarter, not full
    fn test_is_full_moon(#[case] date: &str, #[case] expected: bool) {
        assert_eq!(MoonAlmanac::new().is_full_moon(date).unwrap(), expected);
    }

    #[test]
    fn test_is_full_moon_invalid_date() {
        let err = MoonAlmanac::new().is_full_moon("2018-02-30").unwrap_err();
        assert!(matches!(err, FullMoonError::Time(_)));
    }

    #[test]
    fn test_next_full_moon_before_january_full_moon() {
        let almanac = frozen(2017, 12, 20, 15, 5);
        assert_eq!(almanac.next_full_moon().unwrap(), 1_514_864_066);
    }

    #[test]
    fn test_next_full_moon_after_january_full_moon() {
        let almanac = frozen(2018, 1, 4, 8, 54);
        assert_eq!(almanac.next_full_moon().unwrap(), 1_517_422_824);
        let from = Utc.with_ymd_and_hms(2018, 1, 4, 8, 54, 0).unwrap();
        assert_eq!(almanac.next_full_moon_from(from).unwrap(), 1_517_422_824);
    }

    #[test]
    fn test_next_phase_from() {
        let from = Utc.with_ymd_and_hms(2018, 1, 4, 8, 54, 0).unwrap();
        let almanac = MoonAlmanac::new();
        let first_quarter = almanac
            .next_phase_from(from, PhaseType::FirstQuarter)
            .unwrap();
        assert_eq!(first_quarter, 1_516_783_412);

        let new = almanac.next_phase_from(from, PhaseType::New).unwrap();
        assert!(new > from.timestamp() && new < first_quarter);
    }

    #[test]
    fn test_phases_on() {
        let window = MoonAlmanac::new().phases_on("2018-01-24").unwrap();
        assert_eq!(window.leading, Some(PhaseType::FirstQuarter));
        assert_eq!(window.events.len(), 1);
        assert_eq!(window.events[0].unix_seconds.floor() as i64, 1_516_783_412);
    }

    #[test]
    fn test_complete_series() {
        let almanac =
            frozen(2017, 12, 20, 15, 5).with_correction_series(CorrectionSeries::Complete);
        assert_eq!(almanac.config().correction_series, CorrectionSeries::Complete);
        let next = almanac.next_full_moon().unwrap();
        assert!((next - 1_514_859_929).abs() <= 1, "got {}", next);
        assert!(almanac.is_full_moon("2018-01-02").unwrap());
        assert!(!almanac.is_full_moon("2018-01-01").unwrap());
    }

    #[test]
    fn test_moon_detail_now() {
        let almanac = frozen(2018, 1, 2, 3, 34);
        let detail = almanac.moon_detail_now().unwrap();
        assert!(detail.is_full());
        assert!(detail.illuminated_fraction > 0.9999);
    }

    #[test]
    fn test_with_config_rejects_invalid_settings() {
        let config = AlmanacConfig {
            window_half_width_hours: f64::NAN,
            ..AlmanacConfig::default()
        };
        assert!(matches!(
            MoonAlmanac::new().with_config(config),
            Err(FullMoonError::Config(_))
        ));
    }

    #[test]
    fn test_with_config() {
        let config = AlmanacConfig {
            max_search_iterations: 1,
            ..AlmanacConfig::default()
        };
        let almanac = MoonAlmanac::new().with_config(config).unwrap();
        assert!(matches!(
            almanac.is_full_moon("2018-01-02"),
            Err(FullMoonError::SearchExhausted { .. })
        ));
    }
}
