//! Searches for phase events around an instant
//!
//! Two searches share the true phase primitive of [`PhaseEphemeris`]:
//!
//! - [`PhaseSearch::enumerate_phases_in_window`] lists every principal phase
//!   falling within a window centred on an instant (24 hours wide by default)
//! - [`PhaseSearch::bracket_mean_new_moon`] finds the lunation whose mean new
//!   moon precedes an instant while the following one comes after it
//!
//! Both walk forward one lunation at a time from a seed index derived from
//! the calendar date, and both are capped so that a logic error surfaces as
//! [`FullMoonError::SearchExhausted`] rather than a hang.

use crate::constants::{HOUR_S, LUNATIONS_PER_YEAR, SYNODIC_MONTH};
use crate::phase::{CorrectionSeries, PhaseEphemeris, PhaseType};
use crate::time::{calendar_date, julian_date, unix_seconds};
use crate::{FullMoonError, Result};
use serde::Serialize;

/// Default half width of the window searched around an instant (hours)
pub const DEFAULT_WINDOW_HALF_WIDTH_HOURS: f64 = 12.0;

/// Default cap on lunations visited by a single search
pub const DEFAULT_MAX_SEARCH_ITERATIONS: usize = 1000;

/// Days before the target instant used to seed the new moon bracket
const BRACKET_SEED_OFFSET_DAYS: f64 = 45.0;

/// A principal phase of the Moon at a specific time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseEvent {
    /// Which phase occurs
    pub phase: PhaseType,
    /// Lunation index the event belongs to
    pub lunation: i64,
    /// Julian date of the event
    pub julian_date: f64,
    /// Seconds since the Unix epoch
    pub unix_seconds: f64,
}

impl PhaseEvent {
    fn new(phase: PhaseType, lunation: i64, julian_date: f64) -> Self {
        Self {
            phase,
            lunation,
            julian_date,
            unix_seconds: unix_seconds(julian_date),
        }
    }
}

/// Phase events found inside a search window
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PhaseWindow {
    /// Phase of the first event in the window, if there is one
    pub leading: Option<PhaseType>,
    /// Events in increasing time order
    pub events: Vec<PhaseEvent>,
    /// Julian date of the window start
    pub start_jd: f64,
    /// Julian date of the window end
    pub end_jd: f64,
}

impl PhaseWindow {
    /// True when no phase event falls in the window
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over events of a given phase
    pub fn events_of(&self, phase: PhaseType) -> impl Iterator<Item = &PhaseEvent> {
        self.events.iter().filter(move |e| e.phase == phase)
    }
}

/// Consecutive lunation indices straddling an instant
///
/// The mean new moon of `k1` is at or before the instant and the mean new
/// moon of `k2 = k1 + 1` is after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LunationBracket {
    pub k1: i64,
    pub k2: i64,
}

/// Lunation index at the start of the calendar month containing `jd`
fn seed_lunation(jd: f64) -> i64 {
    let date = calendar_date(jd);
    ((date.fractional_year() - 1900.0) * LUNATIONS_PER_YEAR).floor() as i64
}

/// Phase searches with a configurable window and iteration cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSearch {
    ephemeris: PhaseEphemeris,
    window_half_width_hours: f64,
    max_iterations: usize,
}

impl Default for PhaseSearch {
    fn default() -> Self {
        Self::new(CorrectionSeries::default())
    }
}

impl PhaseSearch {
    /// Create a search with the default window and iteration cap
    pub fn new(series: CorrectionSeries) -> Self {
        Self {
            ephemeris: PhaseEphemeris::new(series),
            window_half_width_hours: DEFAULT_WINDOW_HALF_WIDTH_HOURS,
            max_iterations: DEFAULT_MAX_SEARCH_ITERATIONS,
        }
    }

    /// Set the half width of the window around the target instant
    pub fn with_window_half_width_hours(mut self, hours: f64) -> Self {
        self.window_half_width_hours = hours;
        self
    }

    /// Set the maximum number of lunations a search may visit
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The phase ephemeris used for event dates
    pub fn ephemeris(&self) -> &PhaseEphemeris {
        &self.ephemeris
    }

    /// List every principal phase within the window centred on `instant` (Unix seconds)
    ///
    /// Lunations are walked from two before the seed month; within each the
    /// phases are visited in lunation order and the search stops at the first
    /// event past the window end.
    pub fn enumerate_phases_in_window(&self, instant: f64) -> Result<PhaseWindow> {
        let half_width = self.window_half_width_hours * HOUR_S;
        let start_jd = julian_date(instant - half_width);
        let end_jd = julian_date(instant + half_width);

        let mut window = PhaseWindow {
            start_jd,
            end_jd,
            ..PhaseWindow::default()
        };

        let mut k = seed_lunation(start_jd) - 2;
        log::debug!(
            "Enumerating phases in JD {:.6}..{:.6} from lunation {}",
            start_jd,
            end_jd,
            k + 1
        );

        for _ in 0..self.max_iterations {
            k += 1;
            for phase in PhaseType::ALL {
                let jd = self.ephemeris.true_phase(k, phase);
                log::trace!("lunation {} {}: JD {:.6}", k, phase, jd);
                if jd >= end_jd {
                    return Ok(window);
                }
                if jd >= start_jd {
                    if window.leading.is_none() {
                        window.leading = Some(phase);
                    }
                    window.events.push(PhaseEvent::new(phase, k, jd));
                }
            }
        }

        log::warn!(
            "Phase enumeration did not pass JD {:.6} within {} lunations",
            end_jd,
            self.max_iterations
        );
        Err(FullMoonError::SearchExhausted {
            iterations: self.max_iterations,
            start_jd,
        })
    }

    /// Find the lunations whose mean new moons straddle `instant`
    pub fn bracket_mean_new_moon(&self, instant: f64) -> Result<LunationBracket> {
        let start_jd = julian_date(instant);
        let seed_jd = start_jd - BRACKET_SEED_OFFSET_DAYS;

        let mut k1 = seed_lunation(seed_jd);
        let mut nt1 = self.ephemeris.mean_phase_date(seed_jd, k1);
        let mut a_date = nt1;
        log::debug!("Bracketing JD {:.6} from lunation {}", start_jd, k1);

        for _ in 0..self.max_iterations {
            a_date += SYNODIC_MONTH;
            let k2 = k1 + 1;
            let nt2 = self.ephemeris.mean_phase_date(a_date, k2);
            if nt1 <= a_date && nt2 > start_jd {
                log::debug!("Lunations {} and {} bracket JD {:.6}", k1, k2, start_jd);
                return Ok(LunationBracket { k1, k2 });
            }
            nt1 = nt2;
            k1 = k2;
        }

        log::warn!(
            "Mean new moon bracket for JD {:.6} not found within {} lunations",
            start_jd,
            self.max_iterations
        );
        Err(FullMoonError::SearchExhausted {
            iterations: self.max_iterations,
            start_jd: seed_jd,
        })
    }

    /// Unix seconds of the first `phase` at or after `instant`
    ///
    /// The candidate comes from the lunation in progress at `instant`; while
    /// it lies in the past the same phase of the following lunation is tried.
    /// A true new moon can fall a few hours before its mean new moon, so the
    /// step past `k2` is needed for instants inside that gap.
    pub fn next_phase(&self, instant: f64, phase: PhaseType) -> Result<PhaseEvent> {
        let bracket = self.bracket_mean_new_moon(instant)?;

        let mut k = bracket.k1;
        for _ in 0..self.max_iterations {
            let candidate = PhaseEvent::new(phase, k, self.ephemeris.true_phase(k, phase));
            if candidate.unix_seconds >= instant {
                log::debug!("Next {} in lunation {}", phase, k);
                return Ok(candidate);
            }
            log::debug!(
                "{} of lunation {} already passed, trying lunation {}",
                phase,
                k,
                k + 1
            );
            k += 1;
        }

        log::warn!(
            "No {} at or after JD {:.6} within {} lunations",
            phase,
            julian_date(instant),
            self.max_iterations
        );
        Err(FullMoonError::SearchExhausted {
            iterations: self.max_iterations,
            start_jd: julian_date(instant),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    // 2018-01-02T00:00:00Z
    const JAN_2_2018: f64 = 1_514_851_200.0;

    #[test]
    fn test_seed_lunation() {
        // 2018-01-01 sits in lunation floor(118 * 12.3685)
        assert_eq!(seed_lunation(2_458_119.5), 1459);
        // 2017-11-01 uses the month fraction of the year: floor(117.8333 * 12.3685)
        assert_eq!(seed_lunation(2_458_058.5), 1457);
    }

    #[test]
    fn test_window_with_full_moon() {
        let search = PhaseSearch::default();
        let window = search.enumerate_phases_in_window(JAN_2_2018).unwrap();

        assert_eq!(window.leading, Some(PhaseType::Full));
        assert_eq!(window.events.len(), 1);
        let event = window.events[0];
        assert_eq!(event.phase, PhaseType::Full);
        assert_eq!(event.lunation, 1459);
        assert_eq!(event.unix_seconds.floor() as i64, 1_514_864_066);
        assert_eq!(window.events_of(PhaseType::Full).count(), 1);
        assert_eq!(window.events_of(PhaseType::New).count(), 0);
    }

    #[test]
    fn test_empty_window() {
        let search = PhaseSearch::default();
        let window = search
            .enumerate_phases_in_window(JAN_2_2018 - 86_400.0)
            .unwrap();
        assert!(window.is_empty());
        assert_eq!(window.leading, None);
    }

    #[test]
    fn test_window_bounds() {
        let search = PhaseSearch::default();
        let window = search.enumerate_phases_in_window(JAN_2_2018).unwrap();
        assert_abs_diff_eq!(window.end_jd - window.start_jd, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(window.start_jd, 2_458_120.0, epsilon = 1e-9);
    }

    #[rstest]
    #[case(CorrectionSeries::LeadingTerm)]
    #[case(CorrectionSeries::Complete)]
    fn test_window_events_sorted_and_contained(#[case] series: CorrectionSeries) {
        // a two week window always holds at least one principal phase
        let search = PhaseSearch::new(series).with_window_half_width_hours(7.0 * 24.0);
        let mut instant = 946_684_800.0; // 2000-01-01
        while instant < 1_893_456_000.0 {
            let window = search.enumerate_phases_in_window(instant).unwrap();
            assert!(!window.is_empty(), "no phase near {}", instant);
            assert_eq!(window.leading, Some(window.events[0].phase));
            for event in &window.events {
                assert!(event.julian_date >= window.start_jd);
                assert!(event.julian_date < window.end_jd);
            }
            assert!(window
                .events
                .windows(2)
                .all(|w| w[0].julian_date < w[1].julian_date));
            instant += 86_400.0 * 11.3;
        }
    }

    #[test]
    fn test_every_phase_found_across_a_month() {
        let search = PhaseSearch::default();
        let mut found = Vec::new();
        for day in 0..31 {
            let window = search
                .enumerate_phases_in_window(JAN_2_2018 + day as f64 * 86_400.0)
                .unwrap();
            found.extend(window.events.iter().map(|e| e.phase));
        }
        for phase in PhaseType::ALL {
            assert!(found.contains(&phase), "{} missing", phase);
        }
    }

    #[test]
    fn test_iteration_cap() {
        let search = PhaseSearch::default().with_max_iterations(1);
        let err = search.enumerate_phases_in_window(JAN_2_2018).unwrap_err();
        assert!(matches!(err, FullMoonError::SearchExhausted { iterations: 1, .. }));

        let err = search.bracket_mean_new_moon(JAN_2_2018).unwrap_err();
        assert!(matches!(err, FullMoonError::SearchExhausted { iterations: 1, .. }));
    }

    #[rstest]
    #[case(1_513_782_300.0, 1459)] // 2017-12-20 15:05
    #[case(1_515_056_040.0, 1459)] // 2018-01-04 08:54
    #[case(1_516_300_000.0, 1460)] // 2018-01-18 18:26
    fn test_bracket_mean_new_moon(#[case] instant: f64, #[case] k1: i64) {
        let search = PhaseSearch::default();
        let bracket = search.bracket_mean_new_moon(instant).unwrap();
        assert_eq!(bracket.k1, k1);
        assert_eq!(bracket.k2, k1 + 1);

        let eph = search.ephemeris();
        let jd = julian_date(instant);
        assert!(eph.mean_phase_date(jd, bracket.k1) <= jd);
        assert!(eph.mean_phase_date(jd, bracket.k2) > jd);
    }

    #[test]
    fn test_bracket_straddles_over_decades() {
        let search = PhaseSearch::new(CorrectionSeries::Complete);
        let mut instant = 0.0;
        while instant < 2_500_000_000.0 {
            let bracket = search.bracket_mean_new_moon(instant).unwrap();
            let jd = julian_date(instant);
            assert_eq!(bracket.k2, bracket.k1 + 1);
            assert!(search.ephemeris().mean_phase_date(jd, bracket.k2) > jd - 0.01);
            assert!(search.ephemeris().mean_phase_date(jd, bracket.k1) < jd + 0.01);
            instant += 86_400.0 * 17.0;
        }
    }

    #[rstest]
    #[case(1_513_782_300.0, 1_514_864_066)]
    #[case(1_515_056_040.0, 1_517_422_824)]
    fn test_next_full_phase(#[case] instant: f64, #[case] expected: i64) {
        let search = PhaseSearch::default();
        let event = search.next_phase(instant, PhaseType::Full).unwrap();
        assert_eq!(event.unix_seconds.floor() as i64, expected);
        assert!(event.unix_seconds >= instant);
    }

    #[test]
    fn test_next_new_moon_before_its_mean_date() {
        // 2017-07-23 16:40, after the true new moon of lunation 1454 but
        // before its mean new moon
        let search = PhaseSearch::default();
        let instant = 1_500_828_000.0;
        let bracket = search.bracket_mean_new_moon(instant).unwrap();
        let passed = search.ephemeris().true_phase(bracket.k2, PhaseType::New);
        assert!(unix_seconds(passed) < instant);

        let event = search.next_phase(instant, PhaseType::New).unwrap();
        assert_eq!(event.lunation, bracket.k2 + 1);
        assert!(event.unix_seconds >= instant);
    }

    #[test]
    fn test_next_phase_never_in_past_around_new_moons() {
        let search = PhaseSearch::default();
        for k in 1400..1480 {
            let mean = unix_seconds(search.ephemeris().mean_phase_date(0.0, k));
            let mut instant = mean - 12.0 * HOUR_S;
            while instant <= mean + 12.0 * HOUR_S {
                for phase in PhaseType::ALL {
                    let event = search.next_phase(instant, phase).unwrap();
                    assert!(event.unix_seconds >= instant, "{} at {}", phase, instant);
                    let previous = search.ephemeris().true_phase(event.lunation - 1, phase);
                    assert!(unix_seconds(previous) < instant, "{} at {}", phase, instant);
                }
                instant += 1_800.0;
            }
        }
    }

    #[test]
    fn test_next_phase_within_one_lunation() {
        let search = PhaseSearch::default();
        let mut instant = 1_500_000_000.0;
        while instant < 1_600_000_000.0 {
            for phase in PhaseType::ALL {
                let event = search.next_phase(instant, phase).unwrap();
                assert!(event.unix_seconds >= instant);
                assert!(event.unix_seconds - instant < 31.0 * 86_400.0);
            }
            instant += 86_400.0 * 5.3;
        }
    }
}
