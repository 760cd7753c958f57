//! Procedural grid mesh animated by band means and coherent noise.
//!
//! The index buffer is a pure function of the resolution and is only rebuilt
//! when the topology changes. The vertex buffer is rewritten every frame, one
//! task per vertex.

mod animator;
pub mod falloff;
mod topology;

// Re-export public types
pub use animator::{
    band_for_row, column_x, displace_vertex, displace_vertices, grid_coords, MeshAnimator, Vertex,
    ROWS_PER_BAND,
};
pub use topology::{MeshTopology, INDEX_CEILING, INDICES_PER_QUAD};
