//! Band analyzer tuning: peak blend, smoothing and beat threshold.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Spectrum band analyzer parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    /// Blend between band mean (0.0) and band peak (1.0), range [0, 1]
    pub peak_influence: f32,

    /// Fraction of the previous smoothed value still present after one second, range [0, 1)
    /// 0.0 disables smoothing entirely
    pub smoothness: f32,

    /// Minimum rise of a band's raw value within one step that counts as a beat (> 0)
    pub beat_threshold: f32,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            peak_influence: 0.5,
            smoothness: 0.02,
            beat_threshold: 0.08,
        }
    }
}

impl AnalyzerParams {
    /// Reject out-of-range parameters before any frame is computed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.peak_influence) {
            return Err(ConfigError::out_of_range(
                "peak_influence",
                self.peak_influence as f64,
                "[0, 1]",
            ));
        }
        if !(0.0..1.0).contains(&self.smoothness) {
            return Err(ConfigError::out_of_range(
                "smoothness",
                self.smoothness as f64,
                "[0, 1)",
            ));
        }
        if !(self.beat_threshold > 0.0 && self.beat_threshold.is_finite()) {
            return Err(ConfigError::out_of_range(
                "beat_threshold",
                self.beat_threshold as f64,
                "(0, inf)",
            ));
        }
        Ok(())
    }
}
