//! Degree based trigonometry helpers
//!
//! The lunar theory is tabulated in degrees, so every periodic term goes
//! through these helpers rather than converting at each call site.

use crate::constants::{DEG2RAD, RAD2DEG};

/// Reduce an angle in degrees to the range [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    angle - 360.0 * (angle / 360.0).floor()
}

/// Sine of an angle given in degrees
pub fn sin_deg(angle: f64) -> f64 {
    (angle * DEG2RAD).sin()
}

/// Cosine of an angle given in degrees
pub fn cos_deg(angle: f64) -> f64 {
    (angle * DEG2RAD).cos()
}

/// Convert degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees * DEG2RAD
}

/// Convert radians to degrees
pub fn to_degrees(radians: f64) -> f64 {
    radians * RAD2DEG
}
