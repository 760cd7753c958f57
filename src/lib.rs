//! Bandwave library - third-octave band analysis driving a procedural grid mesh
//!
//! Each frame a spectrum is reduced to 32 smoothed band means with beat flags,
//! and those means displace a square grid whose static index buffer fits u16.

pub mod analyzer;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mesh;
pub mod noise;
pub mod params;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod spectrum;

pub use error::{ConfigError, PipelineError, Result};
pub use pipeline::{FrameOutcome, FrameReport, MeshFrame, Pipeline, RenderSink, SpectrumProvider};
