//! Grid topology and its static 16-bit index buffer.

use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::{ConfigError, PipelineError, Result};

/// Highest index count (and vertex index) representable by the 16-bit index buffer
pub const INDEX_CEILING: usize = u16::MAX as usize;

/// Indices per quad (two triangles)
pub const INDICES_PER_QUAD: usize = 6;

/// Derived sizes of a `resolution x resolution` grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTopology {
    resolution: usize,
    vertex_count: usize,
    quad_count: usize,
    index_count: usize,
}

impl MeshTopology {
    /// Describe a grid, rejecting sizes the 16-bit index buffer cannot hold
    pub fn new(resolution: usize) -> Result<Self> {
        if resolution < 2 {
            return Err(ConfigError::out_of_range("resolution", resolution as f64, "[32, 105]").into());
        }

        let side = resolution - 1;
        let vertex_count = resolution.checked_mul(resolution);
        let quad_count = side.checked_mul(side);
        let index_count = quad_count.and_then(|q| q.checked_mul(INDICES_PER_QUAD));

        match (vertex_count, quad_count, index_count) {
            (Some(vertex_count), Some(quad_count), Some(index_count))
                if index_count <= INDEX_CEILING && vertex_count - 1 <= INDEX_CEILING =>
            {
                Ok(Self {
                    resolution,
                    vertex_count,
                    quad_count,
                    index_count,
                })
            }
            // Saturates when the count itself overflows usize
            _ => Err(PipelineError::ResourceExhausted {
                resolution,
                indices: index_count.unwrap_or(usize::MAX),
                ceiling: INDEX_CEILING,
            }),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Two triangles for quad `quad`, counter-clockwise seen from +Y
    ///
    /// Quads are numbered row by row over `resolution - 1` columns, so the last
    /// vertex of a row never joins the first vertex of the next.
    pub fn quad_indices(&self, quad: usize) -> [u16; INDICES_PER_QUAD] {
        let r = self.resolution;
        let row = quad / (r - 1);
        let col = quad % (r - 1);

        let top_left = (row * r + col) as u16;
        let top_right = top_left + 1;
        let bottom_left = top_left + r as u16;
        let bottom_right = bottom_left + 1;

        [
            top_left,
            bottom_left,
            top_right,
            top_right,
            bottom_left,
            bottom_right,
        ]
    }

    /// Fill `indices` (length `index_count`) with one parallel task per quad
    pub fn write_indices(&self, dispatcher: &Dispatcher, indices: &mut [u16]) {
        debug_assert_eq!(indices.len(), self.index_count);
        dispatcher.for_each_chunk_mut(indices, INDICES_PER_QUAD, |quad, chunk| {
            chunk.copy_from_slice(&self.quad_indices(quad));
        });
    }

    /// Allocate and build the full index buffer
    pub fn build_indices(&self, dispatcher: &Dispatcher) -> Vec<u16> {
        let mut indices = vec![0u16; self.index_count];
        self.write_indices(dispatcher, &mut indices);
        debug!(
            "Built index buffer: resolution={}, quads={}, indices={}",
            self.resolution, self.quad_count, self.index_count
        );
        indices
    }
}
