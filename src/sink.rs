//! Headless render sinks: statistics, PNG heightmaps and raw vertex dumps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use image::{GrayImage, Luma};
use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::{MeshFrame, RenderSink};

/// Axis-aligned bounds of a vertex set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn of(frame: &MeshFrame<'_>) -> Option<Self> {
        let mut points = frame.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Tracks the latest bounds and logs them every `log_every` frames
#[derive(Debug)]
pub struct StatsSink {
    log_every: u64,
    frames: u64,
    peak_height: f32,
    last: Option<Bounds>,
}

impl StatsSink {
    pub fn new(log_every: u64) -> Self {
        Self {
            log_every: log_every.max(1),
            frames: 0,
            peak_height: 0.0,
            last: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        self.last
    }

    /// Highest vertex seen over the whole run
    pub fn peak_height(&self) -> f32 {
        self.peak_height
    }
}

impl RenderSink for StatsSink {
    fn present(&mut self, frame: &MeshFrame<'_>) -> Result<()> {
        self.frames += 1;
        self.last = Bounds::of(frame);

        if let Some(bounds) = self.last {
            self.peak_height = self.peak_height.max(bounds.max.y);
            if frame.frame % self.log_every == 0 {
                info!(
                    "Frame {}: {} vertices, height [{:.3}, {:.3}], extent {:?}",
                    frame.frame,
                    frame.vertices.len(),
                    bounds.min.y,
                    bounds.max.y,
                    bounds.size()
                );
            }
        }
        Ok(())
    }
}

/// Writes the vertex heights as a grayscale PNG every `every` frames
pub struct HeightmapSink {
    dir: PathBuf,
    every: u64,
    written: Vec<PathBuf>,
}

impl HeightmapSink {
    pub fn new(dir: impl Into<PathBuf>, every: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            every: every.max(1),
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Row-major heightmap image, normalized to the frame's height range
pub fn heightmap_image(frame: &MeshFrame<'_>) -> GrayImage {
    let r = frame.topology.resolution() as u32;
    let (lo, hi) = frame
        .vertices
        .iter()
        .map(|v| v.height())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| (lo.min(h), hi.max(h)));
    let span = hi - lo;

    GrayImage::from_fn(r, r, |x, y| {
        let h = frame.vertices[(y * r + x) as usize].height();
        let gray = if span > f32::EPSILON {
            ((h - lo) / span * 255.0).clamp(0.0, 255.0) as u8
        } else {
            0
        };
        Luma([gray])
    })
}

impl RenderSink for HeightmapSink {
    fn present(&mut self, frame: &MeshFrame<'_>) -> Result<()> {
        if frame.frame % self.every != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("heightmap_{:06}.png", frame.frame));
        heightmap_image(frame).save(&path)?;
        debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Appends raw vertex bytes (`[f32; 3]` per vertex, native endian) for every frame
pub struct RawDumpSink {
    writer: BufWriter<File>,
    bytes: u64,
}

impl RawDumpSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            bytes: 0,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl RenderSink for RawDumpSink {
    fn present(&mut self, frame: &MeshFrame<'_>) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(frame.vertices);
        self.writer.write_all(bytes)?;
        self.bytes += bytes.len() as u64;
        Ok(())
    }
}

/// Fans one frame out to several sinks; the first failure is reported after all have run
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RenderSink for SinkSet {
    fn present(&mut self, frame: &MeshFrame<'_>) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.present(frame) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
