//! Top-level configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{AnalyzerParams, DispatchParams, MeshParams, SourceParams};
use crate::error::{ConfigError, Result};

/// Everything needed to stand up a pipeline
///
/// Missing tables and keys fall back to their defaults, so a config file only
/// needs to name what it changes:
///
/// ```toml
/// [analyzer]
/// smoothness = 0.05
///
/// [mesh]
/// resolution = 96
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub analyzer: AnalyzerParams,
    pub mesh: MeshParams,
    pub dispatch: DispatchParams,
    pub source: SourceParams,
}

impl PipelineConfig {
    /// Parse a TOML document (does not validate)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file (does not validate)
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate every section, reporting the first offending parameter
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.analyzer.validate()?;
        self.mesh.validate()?;
        self.dispatch.validate()?;
        self.source.validate()?;
        Ok(())
    }
}
