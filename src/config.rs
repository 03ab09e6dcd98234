//! Analysis configuration
//!
//! Every threshold the pipeline uses is a named parameter here. Defaults match
//! a 100 Hz capture; callers can override any subset from JSON.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Tunable parameters for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum number of samples for a session to be analyzable
    pub min_samples: usize,
    /// Squared per-sample displacement treated as an unnatural jump
    pub abrupt_jump_sq: i64,
    /// Per-axis displacement (pixels) still counted as stationary
    pub pause_threshold_px: i64,
    /// A pause must last strictly longer than this
    pub min_pause_dwell_sec: f64,
    /// Clicks within this interval of the previous kept click are dropped
    pub debounce_interval_sec: f64,
    /// Backward scan step, in samples
    pub scan_step: usize,
    /// Direction reversal (degrees) that marks an overshoot
    pub overshoot_angle_deg: f64,
    /// Direction change (degrees) that marks the start of a movement
    pub direction_change_deg: f64,
    /// Fraction of the suggested DPI change actually applied
    pub smoothing_factor: f64,
    /// Absolute DPI delta above which a recommendation is flagged as large
    pub large_diff_threshold: f64,
    pub dpi_min: u32,
    pub dpi_max: u32,
    /// Recommended DPI values are floored to a multiple of this
    pub dpi_granularity: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_samples: 100,
            abrupt_jump_sq: 250_000,
            pause_threshold_px: 1,
            min_pause_dwell_sec: 0.2,
            debounce_interval_sec: 0.4,
            scan_step: 25,
            overshoot_angle_deg: 130.0,
            direction_change_deg: 30.0,
            smoothing_factor: 0.6,
            large_diff_threshold: 400.0,
            dpi_min: 100,
            dpi_max: 3200,
            dpi_granularity: 10,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a usable analysis
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.min_samples == 0 {
            return Err(invalid("min_samples must be at least 1"));
        }
        if self.scan_step == 0 {
            return Err(invalid("scan_step must be at least 1"));
        }
        if self.dpi_granularity == 0 {
            return Err(invalid("dpi_granularity must be at least 1"));
        }
        if self.dpi_min > self.dpi_max {
            return Err(invalid("dpi_min must not exceed dpi_max"));
        }
        if self.abrupt_jump_sq <= 0 {
            return Err(invalid("abrupt_jump_sq must be positive"));
        }
        if self.pause_threshold_px < 0 {
            return Err(invalid("pause_threshold_px must not be negative"));
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(invalid("smoothing_factor must be in (0, 1]"));
        }
        if self.min_pause_dwell_sec < 0.0 || self.debounce_interval_sec < 0.0 {
            return Err(invalid("durations must not be negative"));
        }
        for (name, angle) in [
            ("overshoot_angle_deg", self.overshoot_angle_deg),
            ("direction_change_deg", self.direction_change_deg),
        ] {
            if !(angle > 0.0 && angle <= 180.0) {
                return Err(invalid(&format!("{} must be in (0, 180]", name)));
            }
        }
        if self.large_diff_threshold < 0.0 {
            return Err(invalid("large_diff_threshold must not be negative"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> AnalysisError {
    AnalysisError::InvalidConfig(reason.to_string())
}
