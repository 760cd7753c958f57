//! Spectrum source configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest spectrum the analyzer accepts (bins)
pub const MAX_SPECTRUM_LEN: usize = 8192;

/// Spectrum source configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    /// Audio sample rate (Hz), overridden by the WAV header when reading a file
    pub sample_rate_hz: u32,

    /// Spectrum length in bins (power of 2, at most 8192)
    /// The underlying FFT window is twice this long
    pub spectrum_len: usize,

    /// Frames per second driven through the pipeline
    pub fps: u32,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            spectrum_len: 8192,
            fps: 60,
        }
    }
}

impl SourceParams {
    /// Seconds between frames
    pub fn frame_step_s(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Samples in one FFT window
    pub fn window_len(&self) -> usize {
        self.spectrum_len * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spectrum_len.is_power_of_two() || self.spectrum_len > MAX_SPECTRUM_LEN {
            return Err(ConfigError::out_of_range(
                "spectrum_len",
                self.spectrum_len as f64,
                "power of 2 in [1, 8192]",
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::out_of_range(
                "sample_rate_hz",
                0.0,
                "[1, inf)",
            ));
        }
        if self.fps == 0 {
            return Err(ConfigError::out_of_range("fps", 0.0, "[1, inf)"));
        }
        Ok(())
    }
}
