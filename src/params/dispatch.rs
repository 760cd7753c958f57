//! Worker pool sizing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parallel dispatch parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    /// Worker threads in the frame pool (0 = one per logical core)
    pub worker_threads: usize,

    /// Batches shorter than this run inline on the calling thread
    pub parallel_threshold: usize,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            parallel_threshold: 32,
        }
    }
}

impl DispatchParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_threshold == 0 {
            return Err(ConfigError::out_of_range(
                "parallel_threshold",
                0.0,
                "[1, inf)",
            ));
        }
        Ok(())
    }
}
