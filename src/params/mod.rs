//! Parameter definitions with units and documented ranges.
//!
//! Every struct validates itself at setup; nothing is range-checked per frame.

mod analyzer;
mod dispatch;
mod mesh;
mod pipeline;
mod source;

// Re-export all types
pub use analyzer::AnalyzerParams;
pub use dispatch::DispatchParams;
pub use mesh::{validate_resolution, MeshParams, MAX_RESOLUTION, MIN_RESOLUTION};
pub use pipeline::PipelineConfig;
pub use source::{SourceParams, MAX_SPECTRUM_LEN};
