//! Grid mesh topology and displacement parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted grid side length
pub const MIN_RESOLUTION: usize = 32;

/// Largest grid side length whose index buffer fits 16-bit indices
/// 6 * 104^2 = 64,896 indices; 106 would need 66,150
pub const MAX_RESOLUTION: usize = 105;

/// Procedural mesh parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Grid resolution (vertices per side, 64 = 4,096 vertices)
    pub resolution: usize,

    /// Height per unit of smoothed band mean (world units)
    pub scale: f32,

    /// Width of the flat corridor centred on x = 0 (world units, 0 disables it)
    pub corridor_width: f32,

    /// Weight of the [0, 1] noise term (dimensionless)
    pub noise_weight: f32,

    /// Noise spatial frequency (cycles per world unit)
    pub noise_freq: f32,

    /// Distance over which corridor and outer edges fade in (world units, > 0)
    pub edge_smoothness: f32,

    /// OpenSimplex seed
    pub noise_seed: u32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            resolution: 64,
            scale: 24.0,
            corridor_width: 6.0,
            noise_weight: 0.6,
            noise_freq: 0.08,
            edge_smoothness: 8.0,
            noise_seed: 42,
        }
    }
}

impl MeshParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_resolution(self.resolution)?;
        if !self.scale.is_finite() {
            return Err(ConfigError::out_of_range(
                "scale",
                self.scale as f64,
                "finite",
            ));
        }
        if !(self.corridor_width >= 0.0 && self.corridor_width.is_finite()) {
            return Err(ConfigError::out_of_range(
                "corridor_width",
                self.corridor_width as f64,
                "[0, inf)",
            ));
        }
        if !(self.noise_weight >= 0.0 && self.noise_weight.is_finite()) {
            return Err(ConfigError::out_of_range(
                "noise_weight",
                self.noise_weight as f64,
                "[0, inf)",
            ));
        }
        if !(self.noise_freq >= 0.0 && self.noise_freq.is_finite()) {
            return Err(ConfigError::out_of_range(
                "noise_freq",
                self.noise_freq as f64,
                "[0, inf)",
            ));
        }
        if !(self.edge_smoothness > 0.0 && self.edge_smoothness.is_finite()) {
            return Err(ConfigError::out_of_range(
                "edge_smoothness",
                self.edge_smoothness as f64,
                "(0, inf)",
            ));
        }
        Ok(())
    }
}

/// Check a grid resolution against the supported range
pub fn validate_resolution(resolution: usize) -> Result<(), ConfigError> {
    if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
        return Err(ConfigError::out_of_range(
            "resolution",
            resolution as f64,
            "[32, 105]",
        ));
    }
    Ok(())
}
