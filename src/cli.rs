//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::error::Result;
use crate::params::PipelineConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "bandwave")]
#[command(about = "Drive the audio-reactive band mesh headless", long_about = None)]
pub struct Args {
    /// TOML file with analyzer, mesh, dispatch and source tables
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// WAV file to analyze (synthetic signal when omitted)
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Number of frames to run (a WAV source may end earlier)
    #[arg(long, value_name = "COUNT", default_value_t = 600)]
    pub frames: u64,

    /// Frame rate (overrides config)
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Grid resolution (overrides config)
    #[arg(long, value_name = "N")]
    pub resolution: Option<usize>,

    /// Change resolution mid-run: FRAME:RESOLUTION
    #[arg(long, value_name = "FRAME:N", value_parser = parse_resize)]
    pub resize_at: Option<(u64, usize)>,

    /// Kick tempo of the synthetic signal
    #[arg(long, value_name = "BPM", default_value_t = 120.0)]
    pub bpm: f32,

    /// Directory for PNG heightmaps
    #[arg(long, value_name = "DIR")]
    pub heightmaps: Option<PathBuf>,

    /// Write a heightmap every N frames
    #[arg(long, value_name = "N", default_value_t = 30)]
    pub heightmap_every: u64,

    /// Append raw vertex bytes of every frame to this file
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Load the config file (if any) and apply command-line overrides
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Config: {}", path.display());
                PipelineConfig::from_toml_file(path)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(fps) = self.fps {
            config.source.fps = fps;
        }
        if let Some(resolution) = self.resolution {
            config.mesh.resolution = resolution;
        }
        Ok(config)
    }
}

fn parse_resize(s: &str) -> std::result::Result<(u64, usize), String> {
    let (frame, resolution) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:RESOLUTION, got '{}'", s))?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|e| format!("bad frame '{}': {}", frame, e))?;
    let resolution = resolution
        .trim()
        .parse()
        .map_err(|e| format!("bad resolution '{}': {}", resolution, e))?;
    Ok((frame, resolution))
}
