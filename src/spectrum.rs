//! Linear-magnitude spectrum buffer handed to the analyzer each frame.

use crate::error::ConfigError;
use crate::params::MAX_SPECTRUM_LEN;

/// One frame of spectrum magnitudes on a linear axis from 0 to `sample_rate / 2`
///
/// The buffer is allocated once and overwritten in place by the provider.
#[derive(Debug, Clone)]
pub struct SpectrumSample {
    magnitudes: Vec<f32>,
    sample_rate_hz: f32,
}

impl SpectrumSample {
    /// Allocate a zeroed spectrum of `len` bins (power of 2, at most 8192)
    pub fn new(len: usize, sample_rate_hz: f32) -> Result<Self, ConfigError> {
        if !len.is_power_of_two() || len > MAX_SPECTRUM_LEN {
            return Err(ConfigError::out_of_range(
                "spectrum_len",
                len as f64,
                "power of 2 in [1, 8192]",
            ));
        }
        let mut spectrum = Self {
            magnitudes: vec![0.0; len],
            sample_rate_hz: 0.0,
        };
        spectrum.set_sample_rate(sample_rate_hz)?;
        Ok(spectrum)
    }

    /// Build a spectrum from existing magnitudes (mainly for tests and offline tools)
    pub fn from_magnitudes(magnitudes: Vec<f32>, sample_rate_hz: f32) -> Result<Self, ConfigError> {
        let mut spectrum = Self::new(magnitudes.len(), sample_rate_hz)?;
        spectrum.magnitudes = magnitudes;
        Ok(spectrum)
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate_hz
    }

    pub fn set_sample_rate(&mut self, sample_rate_hz: f32) -> Result<(), ConfigError> {
        if !(sample_rate_hz > 0.0 && sample_rate_hz.is_finite()) {
            return Err(ConfigError::out_of_range(
                "sample_rate_hz",
                sample_rate_hz as f64,
                "(0, inf)",
            ));
        }
        self.sample_rate_hz = sample_rate_hz;
        Ok(())
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Writable view for providers; length is fixed
    pub fn magnitudes_mut(&mut self) -> &mut [f32] {
        &mut self.magnitudes
    }

    /// Overwrite every bin with `value`
    pub fn fill(&mut self, value: f32) {
        self.magnitudes.fill(value);
    }
}
