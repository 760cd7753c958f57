//! Per-frame vertex displacement driven by band means and coherent noise.

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info};

use super::falloff::falloff;
use super::topology::MeshTopology;
use crate::analyzer::{BandMeans, NUM_BANDS};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::noise::NoiseGenerator;
use crate::params::{validate_resolution, MeshParams};

/// Rows sharing one band
pub const ROWS_PER_BAND: usize = 3;

/// Vertex data for the grid mesh (position only, ready for upload)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// Undisplaced grid position of vertex `idx`
    pub fn at_rest(idx: usize, resolution: usize) -> Self {
        let (col, row) = grid_coords(idx, resolution);
        Self {
            position: [column_x(col, resolution), 0.0, row as f32],
        }
    }

    pub fn height(&self) -> f32 {
        self.position[1]
    }
}

/// Column and row of vertex `idx`
#[inline]
pub fn grid_coords(idx: usize, resolution: usize) -> (usize, usize) {
    (idx % resolution, idx / resolution)
}

/// Map column `[0, resolution - 1]` onto `[-resolution / 2, resolution / 2]`
#[inline]
pub fn column_x(col: usize, resolution: usize) -> f32 {
    let r = resolution as f32;
    -0.5 * r + col as f32 / (r - 1.0) * r
}

/// Band driving `row`: triples of rows walk the table from its top end, wrapping
#[inline]
pub fn band_for_row(row: usize) -> usize {
    (NUM_BANDS - 1) - (row / ROWS_PER_BAND) % NUM_BANDS
}

/// Displaced position of vertex `idx`
pub fn displace_vertex(
    idx: usize,
    means: &BandMeans,
    params: &MeshParams,
    noise: &NoiseGenerator,
    time_s: f32,
) -> Vertex {
    let r = params.resolution;
    let (col, row) = grid_coords(idx, r);
    let x = column_x(col, r);
    let z = row as f32;

    let mut height = means.get(band_for_row(row)) * params.scale;

    let n = noise.sample_unit((x + time_s) * params.noise_freq, (z + time_s) * params.noise_freq);
    let noise_factor = n * params.noise_weight;
    height += noise_factor * height;

    let fade = falloff(x, 0.5 * r as f32, params.corridor_width, params.edge_smoothness);

    Vertex {
        position: [x, fade * (height + noise_factor), z],
    }
}

/// Write every vertex of `vertices` (length `resolution^2`) in one parallel batch
pub fn displace_vertices(
    dispatcher: &Dispatcher,
    vertices: &mut [Vertex],
    means: &BandMeans,
    params: &MeshParams,
    noise: &NoiseGenerator,
    time_s: f32,
) {
    debug_assert_eq!(vertices.len(), params.resolution * params.resolution);
    dispatcher.for_each_mut(vertices, |idx, vertex| {
        *vertex = displace_vertex(idx, means, params, noise, time_s);
    });
}

/// Procedural grid with persistent vertex and index buffers
pub struct MeshAnimator {
    params: MeshParams,
    topology: MeshTopology,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    noise: NoiseGenerator,
    topology_changed: bool,
}

impl MeshAnimator {
    /// Build the initial topology and buffers
    pub fn new(params: MeshParams, dispatcher: &Dispatcher) -> Result<Self> {
        let topology = MeshTopology::new(params.resolution)?;
        params.validate()?;

        let (vertices, indices) = allocate_buffers(&topology, dispatcher);
        debug!(
            "MeshAnimator created: resolution={}, vertices={}, indices={}",
            topology.resolution(),
            vertices.len(),
            indices.len()
        );

        Ok(Self {
            params,
            topology,
            vertices,
            indices,
            noise: NoiseGenerator::new(params.noise_seed),
            topology_changed: true,
        })
    }

    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// True once after construction or a resize, then cleared
    pub fn take_topology_changed(&mut self) -> bool {
        std::mem::take(&mut self.topology_changed)
    }

    /// Re-raise the topology flag after a consumer failed to take the new buffers
    pub fn mark_topology_changed(&mut self) {
        self.topology_changed = true;
    }

    /// Recompute every vertex for this frame
    pub fn compute(&mut self, dispatcher: &Dispatcher, means: &BandMeans, time_s: f32) {
        displace_vertices(
            dispatcher,
            &mut self.vertices,
            means,
            &self.params,
            &self.noise,
            time_s,
        );
    }

    /// Switch to a new grid resolution
    ///
    /// New buffers are fully built before the old ones are released; on error
    /// the current topology and buffers are untouched.
    pub fn resize(&mut self, dispatcher: &Dispatcher, resolution: usize) -> Result<()> {
        if resolution == self.topology.resolution() {
            return Ok(());
        }
        let topology = MeshTopology::new(resolution)?;
        validate_resolution(resolution)?;

        let (vertices, indices) = allocate_buffers(&topology, dispatcher);

        info!(
            "Mesh topology changed: {} -> {} ({} vertices, {} indices)",
            self.topology.resolution(),
            resolution,
            vertices.len(),
            indices.len()
        );

        self.vertices = vertices;
        self.indices = indices;
        self.topology = topology;
        self.params.resolution = resolution;
        self.topology_changed = true;
        Ok(())
    }

    /// Replace displacement parameters, resizing first if the resolution differs
    pub fn set_params(&mut self, params: MeshParams, dispatcher: &Dispatcher) -> Result<()> {
        MeshTopology::new(params.resolution)?;
        params.validate()?;

        self.resize(dispatcher, params.resolution)?;
        if params.noise_seed != self.noise.seed() {
            self.noise = NoiseGenerator::new(params.noise_seed);
        }
        self.params = params;
        Ok(())
    }
}

/// Fresh vertex buffer at rest plus the topology's index buffer
fn allocate_buffers(topology: &MeshTopology, dispatcher: &Dispatcher) -> (Vec<Vertex>, Vec<u16>) {
    let resolution = topology.resolution();
    let mut vertices = vec![Vertex::zeroed(); topology.vertex_count()];
    dispatcher.for_each_mut(&mut vertices, |idx, vertex| {
        *vertex = Vertex::at_rest(idx, resolution);
    });
    (vertices, topology.build_indices(dispatcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::params::DispatchParams;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&DispatchParams {
            worker_threads: 2,
            parallel_threshold: 64,
        })
        .unwrap()
    }

    #[test]
    fn test_column_remap_spans_grid() {
        assert_eq!(column_x(0, 32), -16.0);
        assert_eq!(column_x(31, 32), 16.0);
        assert_eq!(column_x(16, 33), 0.0);
    }

    #[test]
    fn test_band_for_row_groups_and_wraps() {
        assert_eq!(band_for_row(0), 31);
        assert_eq!(band_for_row(2), 31);
        assert_eq!(band_for_row(3), 30);
        assert_eq!(band_for_row(93), 0);
        assert_eq!(band_for_row(95), 0);
        // 32 row groups later the table starts over
        assert_eq!(band_for_row(96), 31);
        assert_eq!(band_for_row(104), 29);
    }

    #[test]
    fn test_flat_input_without_noise_is_flat() {
        let params = MeshParams {
            resolution: 33,
            noise_weight: 0.0,
            ..Default::default()
        };
        let noise = NoiseGenerator::new(1);
        let means = BandMeans::default();
        for idx in 0..params.resolution * params.resolution {
            let v = displace_vertex(idx, &means, &params, &noise, 1.5);
            assert_eq!(v.height(), 0.0);
        }
    }

    #[test]
    fn test_corridor_vertex_is_lower_than_outside() {
        let params = MeshParams {
            resolution: 33,
            scale: 10.0,
            corridor_width: 4.0,
            noise_weight: 0.5,
            noise_freq: 0.1,
            edge_smoothness: 4.0,
            noise_seed: 3,
        };
        let noise = NoiseGenerator::new(params.noise_seed);
        let means = BandMeans::splat(0.8);
        let row = 10;

        let centre = displace_vertex(row * 33 + 16, &means, &params, &noise, 0.25);
        let outside = displace_vertex(row * 33 + 8, &means, &params, &noise, 0.25);

        assert_eq!(centre.position[0], 0.0);
        assert!(outside.position[0] < -4.0);
        assert!(centre.height() < outside.height());
    }

    #[test]
    fn test_outer_edges_pinned_to_zero() {
        let params = MeshParams::default();
        let noise = NoiseGenerator::new(params.noise_seed);
        let means = BandMeans::splat(1.0);
        let r = params.resolution;
        for row in 0..r {
            let left = displace_vertex(row * r, &means, &params, &noise, 0.0);
            let right = displace_vertex(row * r + r - 1, &means, &params, &noise, 0.0);
            assert_eq!(left.height(), 0.0);
            assert_eq!(right.height(), 0.0);
        }
    }

    #[test]
    fn test_height_follows_band_for_row() {
        let params = MeshParams {
            resolution: 40,
            noise_weight: 0.0,
            corridor_width: 0.0,
            edge_smoothness: 1.0,
            scale: 2.0,
            ..Default::default()
        };
        let noise = NoiseGenerator::new(0);
        let mut raw = [0.0; NUM_BANDS];
        raw[31] = 1.0;
        raw[30] = 3.0;
        let means = BandMeans::new(raw);

        // Column 10 sits well inside the edge fade
        let row0 = displace_vertex(10, &means, &params, &noise, 0.0);
        let row3 = displace_vertex(3 * 40 + 10, &means, &params, &noise, 0.0);
        assert_eq!(row0.height(), 2.0);
        assert_eq!(row3.height(), 6.0);
    }

    #[test]
    fn test_compute_matches_per_vertex_function() {
        let dispatcher = dispatcher();
        let params = MeshParams::default();
        let mut animator = MeshAnimator::new(params, &dispatcher).unwrap();
        let means = BandMeans::splat(0.4);

        animator.compute(&dispatcher, &means, 2.0);

        let noise = NoiseGenerator::new(params.noise_seed);
        for (idx, vertex) in animator.vertices().iter().enumerate() {
            assert_eq!(*vertex, displace_vertex(idx, &means, &params, &noise, 2.0));
        }
    }

    #[test]
    fn test_resize_rebuilds_buffers() {
        let dispatcher = dispatcher();
        let mut animator = MeshAnimator::new(MeshParams::default(), &dispatcher).unwrap();
        assert!(animator.take_topology_changed());
        assert!(!animator.take_topology_changed());

        animator.resize(&dispatcher, 105).unwrap();
        assert!(animator.take_topology_changed());
        assert_eq!(animator.vertices().len(), 105 * 105);
        assert_eq!(animator.indices().len(), 6 * 104 * 104);
        assert_eq!(animator.params().resolution, 105);
        assert_eq!(animator.vertices()[0], Vertex::at_rest(0, 105));
    }

    #[test]
    fn test_failed_resize_keeps_previous_topology() {
        let dispatcher = dispatcher();
        let mut animator = MeshAnimator::new(MeshParams::default(), &dispatcher).unwrap();
        animator.take_topology_changed();
        let before = animator.indices().to_vec();

        let err = animator.resize(&dispatcher, 200).unwrap_err();
        assert!(matches!(err, PipelineError::ResourceExhausted { .. }));

        let err = animator.resize(&dispatcher, 16).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        assert_eq!(animator.topology().resolution(), 64);
        assert_eq!(animator.indices(), &before[..]);
        assert!(!animator.take_topology_changed());
    }

    #[test]
    fn test_set_params_changes_seed_and_resolution() {
        let dispatcher = dispatcher();
        let mut animator = MeshAnimator::new(MeshParams::default(), &dispatcher).unwrap();
        let params = MeshParams {
            resolution: 48,
            noise_seed: 9,
            ..Default::default()
        };
        animator.set_params(params, &dispatcher).unwrap();
        assert_eq!(animator.topology().resolution(), 48);
        assert_eq!(animator.params(), &params);
    }
}
