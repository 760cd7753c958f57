//! Coherent noise for mesh displacement.
//!
//! Using OpenSimplex noise for smooth, artifact-free procedural variation.

use noise::{NoiseFn, OpenSimplex};

/// Seeded 2D noise generator, shared read-only by displacement tasks
pub struct NoiseGenerator {
    simplex: OpenSimplex,
    seed: u32,
}

impl NoiseGenerator {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample 2D simplex noise at position
    ///
    /// Returns value in range [-1, 1]
    pub fn sample_2d(&self, x: f32, y: f32) -> f32 {
        self.simplex.get([x as f64, y as f64]) as f32
    }

    /// Sample 2D noise remapped to [0, 1]
    pub fn sample_unit(&self, x: f32, y: f32) -> f32 {
        ((self.sample_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseGenerator")
            .field("seed", &self.seed)
            .finish()
    }
}
