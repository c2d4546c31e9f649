//! Constants module for lunar phase calculations

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Seconds in an hour
pub const HOUR_S: f64 = 3_600.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of 1980 January 0.0, epoch of the orbital elements
pub const EPOCH_1980: f64 = 2_444_238.5;
/// Julian date of 1900 January 0.5, reference for the lunation polynomials
pub const EPOCH_1900: f64 = 2_415_020.0;
/// Days in a Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;
/// Length of the tropical year in days
pub const TROPICAL_YEAR_DAYS: f64 = 365.2422;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: f64 = 2_299_161.0;

// Lunation constants
/// Synodic month (new Moon to new Moon) in days
pub const SYNODIC_MONTH: f64 = 29.530_588_68;
/// Julian date of the mean new Moon of lunation 0 (1900 January)
pub const LUNATION_BASE_JD: f64 = 2_415_020.759_33;
/// Lunations per Julian century, the divisor turning a lunation index into centuries
pub const LUNATIONS_PER_CENTURY: f64 = 1_236.85;
/// Lunations per year, used to seed a lunation index from a calendar year
pub const LUNATIONS_PER_YEAR: f64 = 12.3685;

/// Orbital elements of the Sun and Moon at epoch 1980.0
///
/// The values are the classic mean elements used by low precision lunar
/// ephemerides. They degrade slowly away from 1980 and should not be trusted
/// over more than a few centuries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalElements {
    /// Julian date of the epoch the elements refer to
    pub epoch: f64,
    /// Ecliptic longitude of the Sun at epoch (degrees)
    pub sun_longitude_at_epoch: f64,
    /// Ecliptic longitude of the Sun at perigee (degrees)
    pub sun_longitude_at_perigee: f64,
    /// Eccentricity of Earth's orbit
    pub earth_eccentricity: f64,
    /// Semi-major axis of Earth's orbit (km)
    pub sun_semi_major_axis_km: f64,
    /// Sun's angular size at semi-major axis distance (degrees)
    pub sun_angular_size: f64,
    /// Moon's mean longitude at epoch (degrees)
    pub moon_mean_longitude: f64,
    /// Mean longitude of the lunar perigee at epoch (degrees)
    pub moon_perigee_longitude: f64,
    /// Mean longitude of the ascending node at epoch (degrees)
    pub moon_node_longitude: f64,
    /// Inclination of the Moon's orbit (degrees)
    pub moon_inclination: f64,
    /// Eccentricity of the Moon's orbit
    pub moon_eccentricity: f64,
    /// Moon's angular size at semi-major axis distance (degrees)
    pub moon_angular_size: f64,
    /// Semi-major axis of the Moon's orbit (km)
    pub moon_semi_major_axis_km: f64,
    /// Moon's parallax at semi-major axis distance (degrees)
    pub moon_parallax: f64,
    /// Synodic month in days
    pub synodic_month: f64,
}

/// Mean elements for epoch 1980 January 0.0
pub const ELEMENTS_1980: OrbitalElements = OrbitalElements {
    epoch: EPOCH_1980,
    sun_longitude_at_epoch: 278.833_540,
    sun_longitude_at_perigee: 282.596_403,
    earth_eccentricity: 0.016_718,
    sun_semi_major_axis_km: 1.495_985e8,
    sun_angular_size: 0.533_128,
    moon_mean_longitude: 64.975_464,
    moon_perigee_longitude: 349.383_063,
    moon_node_longitude: 151.950_429,
    moon_inclination: 5.145_396,
    moon_eccentricity: 0.054_900,
    moon_angular_size: 0.5181,
    moon_semi_major_axis_km: 384_401.0,
    moon_parallax: 0.9507,
    synodic_month: SYNODIC_MONTH,
};

impl Default for OrbitalElements {
    fn default() -> Self {
        ELEMENTS_1980
    }
}
