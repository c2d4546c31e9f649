//! Lunar phase ephemeris
//!
//! Dates of the mean and true phases of the Moon for a given lunation index
//! `k`, counted from the mean new Moon of 1900 January. The true phases add a
//! periodic correction series in the mean anomalies of the Sun (`M`) and Moon
//! (`M'`) and the Moon's argument of latitude (`F`).

use crate::angle::{cos_deg, sin_deg};
use crate::constants::{
    EPOCH_1900, JULIAN_CENTURY_DAYS, LUNATIONS_PER_CENTURY, LUNATION_BASE_JD, SYNODIC_MONTH,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance when matching a phase fraction against the canonical phases
const PHASE_TOLERANCE: f64 = 0.01;

/// The four principal phases of the Moon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    New,
    FirstQuarter,
    Full,
    LastQuarter,
}

impl PhaseType {
    /// All phases in the order they occur within one lunation
    pub const ALL: [PhaseType; 4] = [
        PhaseType::New,
        PhaseType::FirstQuarter,
        PhaseType::Full,
        PhaseType::LastQuarter,
    ];

    /// Fraction of the lunation at which this phase occurs
    pub fn fraction(&self) -> f64 {
        match self {
            PhaseType::New => 0.0,
            PhaseType::FirstQuarter => 0.25,
            PhaseType::Full => 0.5,
            PhaseType::LastQuarter => 0.75,
        }
    }

    /// Quarter number, `floor(4 * fraction)`: 0 new, 1 first quarter, 2 full, 3 last quarter
    pub fn tag(&self) -> u8 {
        (4.0 * self.fraction()).floor() as u8
    }

    /// Phase for a quarter number as returned by [`PhaseType::tag`]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Canonical phase matching `fraction` within 0.01, if any
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| (fraction - phase.fraction()).abs() < PHASE_TOLERANCE)
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            PhaseType::New => "new moon",
            PhaseType::FirstQuarter => "first quarter",
            PhaseType::Full => "full moon",
            PhaseType::LastQuarter => "last quarter",
        }
    }
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "new" | "new-moon" => Ok(PhaseType::New),
            "first-quarter" | "first" => Ok(PhaseType::FirstQuarter),
            "full" | "full-moon" => Ok(PhaseType::Full),
            "last-quarter" | "last" | "third-quarter" => Ok(PhaseType::LastQuarter),
            other => {
                let numeric = match other.parse::<u8>() {
                    Ok(tag) => PhaseType::from_tag(tag),
                    Err(_) => other.parse::<f64>().ok().and_then(PhaseType::from_fraction),
                };
                numeric.ok_or_else(|| format!("unknown phase '{}'", other))
            }
        }
    }
}

/// How much of the periodic correction series is applied to phase dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSeries {
    /// Only the leading solar anomaly term of each series, plus the quarter
    /// asymmetry. Mean phases carry no secular polynomial. These are the
    /// timings behind the published full moon tables this crate reproduces.
    #[default]
    LeadingTerm,
    /// Every periodic term, and the secular polynomial on mean phases
    Complete,
}

/// One periodic term `coefficient * sin(m*M + m_prime*M' + f*F)`
#[derive(Debug, Clone, Copy)]
struct PeriodicTerm {
    coefficient: f64,
    m: f64,
    m_prime: f64,
    f: f64,
}

const fn term(coefficient: f64, m: f64, m_prime: f64, f: f64) -> PeriodicTerm {
    PeriodicTerm {
        coefficient,
        m,
        m_prime,
        f,
    }
}

/// New and full moon terms following the leading `(0.1734 - 0.000393 T) sin M`
#[rustfmt::skip]
const NEW_FULL_TERMS: [PeriodicTerm; 12] = [
    term( 0.0021, 2.0,  0.0, 0.0),
    term(-0.4068, 0.0,  1.0, 0.0),
    term( 0.0161, 0.0,  2.0, 0.0),
    term(-0.0004, 0.0,  3.0, 0.0),
    term( 0.0104, 0.0,  0.0, 2.0),
    term(-0.0051, 1.0,  1.0, 0.0),
    term(-0.0074, 1.0, -1.0, 0.0),
    term( 0.0004, 1.0,  0.0, 2.0),
    term(-0.0004, -1.0, 0.0, 2.0),
    term(-0.0006, 0.0,  1.0, 2.0),
    term( 0.0010, 0.0, -1.0, 2.0),
    term( 0.0005, 1.0,  2.0, 0.0),
];

/// Quarter terms following the leading `(0.1721 - 0.0004 T) sin M`
#[rustfmt::skip]
const QUARTER_TERMS: [PeriodicTerm; 14] = [
    term( 0.0021, 2.0,  0.0, 0.0),
    term(-0.6280, 0.0,  1.0, 0.0),
    term( 0.0089, 0.0,  2.0, 0.0),
    term(-0.0004, 0.0,  3.0, 0.0),
    term( 0.0079, 0.0,  0.0, 2.0),
    term(-0.0119, 1.0,  1.0, 0.0),
    term(-0.0047, 1.0, -1.0, 0.0),
    term( 0.0003, 1.0,  0.0, 2.0),
    term(-0.0004, -1.0, 0.0, 2.0),
    term(-0.0006, 0.0,  1.0, 2.0),
    term( 0.0021, 0.0, -1.0, 2.0),
    term( 0.0003, 1.0,  2.0, 0.0),
    term( 0.0004, 1.0, -2.0, 0.0),
    term(-0.0003, 2.0,  1.0, 0.0),
];

fn sum_terms(terms: &[PeriodicTerm], m: f64, m_prime: f64, f: f64) -> f64 {
    terms
        .iter()
        .map(|t| t.coefficient * sin_deg(t.m * m + t.m_prime * m_prime + t.f * f))
        .sum()
}

/// Secular part of the lunation polynomial, `T` in Julian centuries
fn secular_terms(t: f64) -> f64 {
    let t2 = t.powi(2);
    let t3 = t.powi(3);
    (0.000_117_8 * t2) - (0.000_000_155 * t3)
        + (0.000_33 * sin_deg(166.56 + 132.87 * t - 0.009_173 * t2))
}

/// Phase date calculator for a chosen correction series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseEphemeris {
    series: CorrectionSeries,
}

impl PhaseEphemeris {
    /// Create an ephemeris applying `series`
    pub fn new(series: CorrectionSeries) -> Self {
        Self { series }
    }

    /// The correction series in use
    pub fn series(&self) -> CorrectionSeries {
        self.series
    }

    /// Julian date of the mean new moon of lunation `k`
    ///
    /// `seed_jd` is the date the lunation index was derived from; it only
    /// enters through the secular polynomial of the complete series.
    pub fn mean_phase_date(&self, seed_jd: f64, k: i64) -> f64 {
        let mean = LUNATION_BASE_JD + SYNODIC_MONTH * k as f64;
        match self.series {
            CorrectionSeries::LeadingTerm => mean,
            CorrectionSeries::Complete => {
                let t = (seed_jd - EPOCH_1900) / JULIAN_CENTURY_DAYS;
                mean + secular_terms(t)
            }
        }
    }

    /// Julian date of the true phase `phase_fraction` of lunation `k`
    ///
    /// Fractions that are not within 0.01 of 0, 0.25, 0.5 or 0.75 get the
    /// uncorrected mean date.
    pub fn true_phase_date(&self, k: i64, phase_fraction: f64) -> f64 {
        let k = k as f64 + phase_fraction;
        let t = k / LUNATIONS_PER_CENTURY;
        let t2 = t.powi(2);
        let t3 = t.powi(3);

        let mut pt = LUNATION_BASE_JD + (SYNODIC_MONTH * k) + (0.000_117_8 * t2)
            - (0.000_000_155 * t3)
            + (0.000_33 * sin_deg(166.56 + 132.87 * t - 0.009_173 * t2));

        // Sun's mean anomaly
        let m = 359.2242 + (29.105_356_08 * k) - (0.000_033_3 * t2) - (0.000_003_47 * t3);
        // Moon's mean anomaly
        let m_prime =
            306.0253 + (385.816_918_06 * k) + (0.010_730_6 * t2) + (0.000_012_36 * t3);
        // Moon's argument of latitude
        let f = 21.2964 + (390.670_506_46 * k) - (0.001_652_8 * t2) - (0.000_002_39 * t3);

        let is_syzygy = phase_fraction < PHASE_TOLERANCE
            || (phase_fraction - 0.5).abs() < PHASE_TOLERANCE;
        let is_quarter = (phase_fraction - 0.25).abs() < PHASE_TOLERANCE
            || (phase_fraction - 0.75).abs() < PHASE_TOLERANCE;

        if is_syzygy {
            pt += (0.1734 - 0.000_393 * t) * sin_deg(m);
            if self.series == CorrectionSeries::Complete {
                pt += sum_terms(&NEW_FULL_TERMS, m, m_prime, f);
            }
        } else if is_quarter {
            pt += (0.1721 - 0.0004 * t) * sin_deg(m);
            if self.series == CorrectionSeries::Complete {
                pt += sum_terms(&QUARTER_TERMS, m, m_prime, f);
            }

            let asymmetry = 0.0028 - 0.0004 * cos_deg(m) + 0.0003 * cos_deg(m_prime);
            if phase_fraction < 0.5 {
                pt += asymmetry;
            } else {
                pt -= asymmetry;
            }
        }

        pt
    }

    /// Julian date of `phase` in lunation `k`
    pub fn true_phase(&self, k: i64, phase: PhaseType) -> f64 {
        self.true_phase_date(k, phase.fraction())
    }
}
