//! Frame coordinator: spectrum in, analyzer, mesh animator, sink and beats out.
//!
//! Stages run strictly in dependency order on the driving thread. Each stage
//! is one blocking batch on the dispatcher, so the band means exist before any
//! vertex task starts, and the buffers handed to the sink are complete.

mod beats;

pub use beats::{BeatBus, BeatEvent, BeatListener};

use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::analyzer::{Analyzer, BeatSet};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::mesh::{MeshAnimator, MeshTopology, Vertex};
use crate::params::PipelineConfig;
use crate::spectrum::SpectrumSample;

/// Upstream spectrum provider
pub trait SpectrumProvider {
    /// Overwrite `spectrum` with the next frame's magnitudes and sample rate
    ///
    /// Returns `Ok(false)` once the stream is exhausted.
    fn fill(&mut self, spectrum: &mut SpectrumSample) -> Result<bool>;
}

/// Downstream render sink
pub trait RenderSink {
    /// Consume one complete frame; buffers are only valid for the call
    fn present(&mut self, frame: &MeshFrame<'_>) -> Result<()>;
}

/// Completed mesh buffers for one frame
#[derive(Debug, Clone, Copy)]
pub struct MeshFrame<'a> {
    pub frame: u64,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u16],
    pub topology: &'a MeshTopology,
    /// Index buffer differs from the previous frame's and must be re-uploaded
    pub topology_changed: bool,
}

/// Per-frame timing and beat summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub beats: BeatSet,
    pub analyze: Duration,
    pub animate: Duration,
    pub topology_changed: bool,
}

/// What happened to one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Frame computed and presented
    Presented(FrameReport),
    /// A collaborator failed; the frame's output was dropped
    Discarded,
    /// The spectrum provider has no more input
    EndOfStream,
}

/// Owns every frame-critical buffer and drives the stages in order
pub struct Pipeline {
    dispatcher: Dispatcher,
    analyzer: Analyzer,
    animator: MeshAnimator,
    spectrum: SpectrumSample,
    beats: BeatBus,
    frame: u64,
    // Time of frames discarded before reaching the analyzer
    pending_dt_s: f32,
}

impl Pipeline {
    /// Validate `config` and allocate all buffers
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        // Index ceiling is reported ahead of the supported range
        MeshTopology::new(config.mesh.resolution)?;
        config.validate()?;

        let dispatcher = Dispatcher::new(&config.dispatch)?;
        let analyzer = Analyzer::new(config.analyzer)?;
        let animator = MeshAnimator::new(config.mesh, &dispatcher)?;
        let spectrum = SpectrumSample::new(
            config.source.spectrum_len,
            config.source.sample_rate_hz as f32,
        )?;

        debug!(
            "Pipeline ready: spectrum_len={}, resolution={}, workers={}",
            spectrum.len(),
            animator.topology().resolution(),
            dispatcher.worker_count()
        );

        Ok(Self {
            dispatcher,
            analyzer,
            animator,
            spectrum,
            beats: BeatBus::new(),
            frame: 0,
            pending_dt_s: 0.0,
        })
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn animator(&self) -> &MeshAnimator {
        &self.animator
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Frames the provider was asked to supply, excluding the end-of-stream call
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Register a synchronous beat callback
    pub fn add_beat_listener(&mut self, listener: Box<dyn BeatListener>) {
        self.beats.add_listener(listener);
    }

    /// Open a channel carrying the latest frame's beats
    pub fn subscribe_beats(&mut self) -> Receiver<BeatEvent> {
        self.beats.subscribe()
    }

    /// Change grid resolution between frames; the old topology survives a failure
    pub fn set_resolution(&mut self, resolution: usize) -> Result<()> {
        self.animator.resize(&self.dispatcher, resolution)
    }

    /// Zero the analyzer's carried band state
    pub fn reset_analyzer(&mut self) {
        self.analyzer.reset();
    }

    /// Run one frame
    ///
    /// # Arguments
    /// * `provider` - Source of this frame's spectrum
    /// * `sink` - Receives the finished vertex and index buffers
    /// * `time_s` - Animation time in seconds
    /// * `dt_s` - Real time since the previous frame
    pub fn run_frame(
        &mut self,
        provider: &mut dyn SpectrumProvider,
        sink: &mut dyn RenderSink,
        time_s: f32,
        dt_s: f32,
    ) -> Result<FrameOutcome> {
        let frame = self.frame;

        match provider.fill(&mut self.spectrum) {
            Ok(true) => self.frame += 1,
            Ok(false) => return Ok(FrameOutcome::EndOfStream),
            Err(e) => {
                self.frame += 1;
                // The analyzer still owes this frame's elapsed time
                self.pending_dt_s += finite_dt(dt_s);
                warn!("Frame {} discarded: {}", frame, e);
                return Ok(FrameOutcome::Discarded);
            }
        }

        // Stage 1: band means depend on the spectrum
        let elapsed_s = std::mem::take(&mut self.pending_dt_s) + finite_dt(dt_s);
        let started = Instant::now();
        let results = self
            .analyzer
            .analyze(&self.dispatcher, &self.spectrum, elapsed_s);
        let means = results.smoothed_means();
        let beats = results.beats();
        let analyze = started.elapsed();

        // Stage 2: vertices depend on band means
        let started = Instant::now();
        self.animator.compute(&self.dispatcher, &means, time_s);
        let animate = started.elapsed();

        let topology_changed = self.animator.take_topology_changed();
        let mesh = MeshFrame {
            frame,
            vertices: self.animator.vertices(),
            indices: self.animator.indices(),
            topology: self.animator.topology(),
            topology_changed,
        };

        if let Err(e) = sink.present(&mesh) {
            warn!("Frame {} discarded by sink: {}", frame, e);
            if topology_changed {
                // The sink never saw the new index buffer
                self.animator.mark_topology_changed();
            }
            self.beats.publish(frame, BeatSet::EMPTY);
            return Ok(FrameOutcome::Discarded);
        }

        self.beats.publish(frame, beats);

        trace!(
            "Frame {}: analyze={:?} animate={:?} beats={}",
            frame,
            analyze,
            animate,
            beats.len()
        );

        Ok(FrameOutcome::Presented(FrameReport {
            frame,
            beats,
            analyze,
            animate,
            topology_changed,
        }))
    }
}

/// Negative and non-finite steps contribute no time
fn finite_dt(dt_s: f32) -> f32 {
    if dt_s.is_finite() {
        dt_s.max(0.0)
    } else {
        0.0
    }
}
