//! Error types for pipeline setup and per-frame collaborators.
//!
//! Configuration problems are reported once, at setup, with the offending
//! parameter and its valid range. Degenerate audio never surfaces here: the
//! analyzer clamps its way through silence and collapsed bin ranges.

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A parameter outside its accepted range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Numeric parameter out of range (NaN always lands here)
    #[error("{name} = {value} is out of range, expected {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
}

impl ConfigError {
    pub fn out_of_range(name: &'static str, value: f64, range: &'static str) -> Self {
        Self::OutOfRange { name, value, range }
    }
}

/// Errors raised while building or driving the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Requested topology does not fit 16-bit indices; the previous topology is kept
    #[error(
        "Resolution {resolution} needs {indices} indices, exceeding the 16-bit ceiling of {ceiling}"
    )]
    ResourceExhausted {
        resolution: usize,
        indices: usize,
        ceiling: usize,
    },

    /// Worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Upstream spectrum provider failure
    #[error("Spectrum source error: {0}")]
    Source(String),

    /// Downstream render sink failure
    #[error("Render sink error: {0}")]
    Sink(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration file
    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// Heightmap encoding failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// WAV decoding failure
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
