//! Illumination and position of the Moon at an instant
//!
//! A low precision solution built from the epoch 1980.0 mean elements: the
//! Sun's position from Kepler's equation, and the Moon's from its mean motion
//! plus the evection, annual equation, equation of the centre and variation.
//! Good to a few arcminutes, which is plenty for deciding whether the disk is
//! fully lit.

use crate::angle::{normalize_degrees, sin_deg, to_degrees, to_radians};
use crate::constants::{OrbitalElements, TROPICAL_YEAR_DAYS};
use crate::kepler::{solve_eccentric_anomaly, true_anomaly};
use crate::time::julian_date;
use crate::Result;
use serde::Serialize;

/// Position and illumination of the Moon at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonDetail {
    /// Julian date the sample was computed for
    pub julian_date: f64,
    /// Fraction of the lunation elapsed, 0 at new moon and 0.5 at full
    pub phase_fraction: f64,
    /// Illuminated fraction of the disk, 0 to 1
    pub illuminated_fraction: f64,
    /// Days since the last new moon
    pub age_days: f64,
    /// Earth-Moon distance (km)
    pub moon_distance_km: f64,
    /// Angular diameter of the Moon (degrees)
    pub moon_angular_diameter: f64,
    /// Horizontal parallax of the Moon (degrees)
    pub moon_parallax: f64,
    /// Ecliptic longitude of the Moon (degrees)
    pub moon_longitude: f64,
    /// Ecliptic latitude of the Moon (degrees)
    pub moon_latitude: f64,
    /// Earth-Sun distance (km)
    pub sun_distance_km: f64,
    /// Angular diameter of the Sun (degrees)
    pub sun_angular_diameter: f64,
    /// Ecliptic longitude of the Sun (degrees)
    pub sun_longitude: f64,
}

impl MoonDetail {
    /// Whether the disk counts as full, i.e. the illuminated fraction rounds to one
    pub fn is_full(&self) -> bool {
        self.illuminated_fraction.round() == 1.0
    }
}

/// Compute the Moon's illumination and position at `instant` (Unix seconds)
pub fn moon_detail(instant: f64, elements: &OrbitalElements) -> Result<MoonDetail> {
    let jd = julian_date(instant);
    let day = jd - elements.epoch;
    let ecc = elements.earth_eccentricity;

    // Sun
    let n = normalize_degrees((360.0 / TROPICAL_YEAR_DAYS) * day);
    let m = normalize_degrees(
        n + elements.sun_longitude_at_epoch - elements.sun_longitude_at_perigee,
    );
    let m_rad = to_radians(m);

    let ec = solve_eccentric_anomaly(m, ecc)?;
    let v = true_anomaly(ec, ecc);
    let sun_longitude = normalize_degrees(v + elements.sun_longitude_at_perigee);
    let distance_factor = (1.0 + ecc * to_radians(v).cos()) / (1.0 - ecc * ecc);
    let sun_distance_km = elements.sun_semi_major_axis_km / distance_factor;
    let sun_angular_diameter = distance_factor * elements.sun_angular_size;

    // Moon mean longitude, anomaly and node
    let ml = normalize_degrees(13.176_396_6 * day + elements.moon_mean_longitude);
    let mm = normalize_degrees(ml - 0.111_404_1 * day - elements.moon_perigee_longitude);
    let mn = normalize_degrees(elements.moon_node_longitude - 0.052_953_9 * day);

    let evection = 1.2739 * sin_deg(2.0 * (ml - sun_longitude) - mm);
    let annual_eq = 0.1858 * m_rad.sin();
    let a3 = 0.37 * m_rad.sin();

    let mmp = mm + evection - annual_eq - a3;
    let centre = 6.2886 * sin_deg(mmp);
    let a4 = 0.214 * sin_deg(2.0 * mmp);

    let lp = ml + evection + centre - annual_eq + a4;
    let variation = 0.6583 * sin_deg(2.0 * (lp - sun_longitude));
    let lpp = lp + variation;

    let np = mn - 0.16 * m_rad.sin();
    let inclination = to_radians(elements.moon_inclination);
    let y = sin_deg(lpp - np) * inclination.cos();
    let x = to_radians(lpp - np).cos();
    let moon_longitude = normalize_degrees(to_degrees(y.atan2(x)) + np);
    let moon_latitude = to_degrees((sin_deg(lpp - np) * inclination.sin()).asin());

    // Phase
    let age = lpp - sun_longitude;
    let illuminated_fraction = (1.0 - to_radians(age).cos()) / 2.0;
    let phase_fraction = normalize_degrees(age) / 360.0;
    let age_days = elements.synodic_month * phase_fraction;

    let mecc = elements.moon_eccentricity;
    let moon_distance_km = (elements.moon_semi_major_axis_km * (1.0 - mecc * mecc))
        / (1.0 + mecc * to_radians(mmp + centre).cos());
    let distance_ratio = moon_distance_km / elements.moon_semi_major_axis_km;

    Ok(MoonDetail {
        julian_date: jd,
        phase_fraction,
        illuminated_fraction,
        age_days,
        moon_distance_km,
        moon_angular_diameter: elements.moon_angular_size / distance_ratio,
        moon_parallax: elements.moon_parallax / distance_ratio,
        moon_longitude,
        moon_latitude,
        sun_distance_km,
        sun_angular_diameter,
        sun_longitude,
    })
}
