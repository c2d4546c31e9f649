//! Kepler's equation solver
//!
//! Solves `E - e sin E = M` for the eccentric anomaly `E` by Newton-Raphson
//! iteration. Only elliptical orbits with small eccentricity are expected
//! (the Earth's and the Moon's orbits), so no parabolic or hyperbolic
//! handling is attempted.

use crate::angle::to_radians;
use crate::{FullMoonError, Result};

/// Convergence threshold on the residual of Kepler's equation (radians)
pub const KEPLER_EPSILON: f64 = 1e-6;

/// Upper bound on Newton-Raphson iterations before the solver reports failure
pub const KEPLER_MAX_ITERATIONS: usize = 1000;

/// Solve Kepler's equation for the eccentric anomaly
///
/// # Arguments
///
/// * `mean_anomaly` - Mean anomaly in degrees
/// * `eccentricity` - Orbital eccentricity, expected in (0, 1)
///
/// # Returns
///
/// The eccentric anomaly in radians. At least one correction step is always
/// applied, even when the starting guess already satisfies the tolerance.
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    let m = to_radians(mean_anomaly);
    let mut e = m;

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = e - eccentricity * e.sin() - m;
        e -= delta / (1.0 - eccentricity * e.cos());
        if delta.abs() <= KEPLER_EPSILON {
            return Ok(e);
        }
    }

    log::warn!(
        "Kepler solver exhausted {} iterations for M={} e={}",
        KEPLER_MAX_ITERATIONS,
        mean_anomaly,
        eccentricity
    );
    Err(FullMoonError::KeplerDivergence {
        iterations: KEPLER_MAX_ITERATIONS,
        mean_anomaly,
        eccentricity,
    })
}

/// True anomaly (degrees) from an eccentric anomaly (radians)
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let ratio = ((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt();
    2.0 * (ratio * (eccentric_anomaly / 2.0).tan()).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn residual(e: f64, ecc: f64, mean_anomaly_deg: f64) -> f64 {
        e - ecc * e.sin() - to_radians(mean_anomaly_deg)
    }

    #[test]
    fn test_circular_orbit_is_identity() {
        let e = solve_eccentric_anomaly(123.0, 0.0).unwrap();
        assert_abs_diff_eq!(e, to_radians(123.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_mean_anomaly() {
        let e = solve_eccentric_anomaly(0.0, 0.016718).unwrap();
        assert_abs_diff_eq!(e, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_takes_a_step_when_already_within_tolerance() {
        // starting residual of about 2.9e-9 rad is already below the tolerance
        let ecc = 0.016718;
        let m = to_radians(1e-5);
        assert!(residual(m, ecc, 1e-5).abs() < KEPLER_EPSILON);

        let stepped = m - (m - ecc * m.sin() - m) / (1.0 - ecc * m.cos());
        let e = solve_eccentric_anomaly(1e-5, ecc).unwrap();
        assert_eq!(e, stepped);
        assert!(e > m);
    }

    #[rstest]
    #[case(0.016718)]
    #[case(0.0549)]
    #[case(0.0001)]
    #[case(0.069)]
    fn test_convergence_over_full_circle(#[case] ecc: f64) {
        let mut m = 0.0;
        while m < 360.0 {
            let e = solve_eccentric_anomaly(m, ecc).unwrap();
            // the returned value has had one more step than the tested residual
            assert!(residual(e, ecc, m).abs() < KEPLER_EPSILON, "M={} e={}", m, ecc);
            m += 7.5;
        }
    }

    #[test]
    fn test_known_solution() {
        // Meeus, Astronomical Algorithms, example 30.a: e = 0.1, M = 5 deg
        let e = solve_eccentric_anomaly(5.0, 0.1).unwrap();
        assert_abs_diff_eq!(e.to_degrees(), 5.554_589, epsilon = 1e-5);
    }

    #[test]
    fn test_true_anomaly() {
        assert_abs_diff_eq!(true_anomaly(0.0, 0.0549), 0.0, epsilon = 1e-12);
        // circular orbit: true anomaly equals eccentric anomaly
        assert_abs_diff_eq!(true_anomaly(1.0, 0.0), 1.0_f64.to_degrees(), epsilon = 1e-9);
        // ahead of the eccentric anomaly on the outbound half of an ellipse
        assert!(true_anomaly(1.0, 0.1) > 1.0_f64.to_degrees());
    }
}
