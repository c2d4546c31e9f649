//! Almanac configuration
//!
//! Settings can be built in code or loaded from a JSON document; every field
//! is optional in JSON and falls back to its default.

use crate::constants::OrbitalElements;
use crate::phase::CorrectionSeries;
use crate::search::{DEFAULT_MAX_SEARCH_ITERATIONS, DEFAULT_WINDOW_HALF_WIDTH_HOURS};
use crate::{FullMoonError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a [`MoonAlmanac`](super::MoonAlmanac)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlmanacConfig {
    /// Periodic correction series applied to phase dates
    pub correction_series: CorrectionSeries,
    /// Half width in hours of the window searched around a date
    pub window_half_width_hours: f64,
    /// Maximum lunations visited by a single search
    pub max_search_iterations: usize,
    /// Orbital elements for the illumination calculation
    pub elements: OrbitalElements,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            correction_series: CorrectionSeries::default(),
            window_half_width_hours: DEFAULT_WINDOW_HALF_WIDTH_HOURS,
            max_search_iterations: DEFAULT_MAX_SEARCH_ITERATIONS,
            elements: OrbitalElements::default(),
        }
    }
}

impl AlmanacConfig {
    /// Parse and validate a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AlmanacConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading almanac configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the settings describe a usable search
    pub fn validate(&self) -> Result<()> {
        if !self.window_half_width_hours.is_finite() || self.window_half_width_hours <= 0.0 {
            return Err(FullMoonError::Config(format!(
                "window_half_width_hours must be positive, got {}",
                self.window_half_width_hours
            )));
        }
        if self.max_search_iterations == 0 {
            return Err(FullMoonError::Config(
                "max_search_iterations must be at least 1".to_string(),
            ));
        }
        let eccentricities = [
            self.elements.earth_eccentricity,
            self.elements.moon_eccentricity,
        ];
        if eccentricities.iter().any(|e| !(0.0..1.0).contains(e)) {
            return Err(FullMoonError::Config(format!(
                "orbital eccentricities must lie in [0, 1), got {:?}",
                eccentricities
            )));
        }
        Ok(())
    }
}
