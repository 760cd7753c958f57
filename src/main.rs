//! Bandwave - headless runner for the audio-reactive band mesh
//!
//! Feeds a synthetic or WAV spectrum through the pipeline at a fixed frame
//! step and hands every mesh to the configured sinks.

use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};

use bandwave::cli::Args;
use bandwave::pipeline::{BeatEvent, FrameOutcome, Pipeline, SpectrumProvider};
use bandwave::sink::{HeightmapSink, RawDumpSink, SinkSet, StatsSink};
use bandwave::source::{SyntheticSpectrum, WavSpectrum};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    bandwave::logging::init(&args.log_level);

    let config = args.pipeline_config()?;
    let mut pipeline = Pipeline::new(&config)?;

    let mut provider: Box<dyn SpectrumProvider> = match &args.wav {
        Some(path) => {
            let wav = WavSpectrum::open(path, config.source.spectrum_len, config.source.fps)?;
            info!("Source: {} ({:.1}s)", path.display(), wav.remaining_s());
            Box::new(wav)
        }
        None => {
            info!("Source: synthetic at {} BPM", args.bpm);
            Box::new(SyntheticSpectrum::new(
                config.source.spectrum_len,
                config.source.sample_rate_hz,
                config.source.fps,
                args.bpm,
            ))
        }
    };

    let mut sinks = SinkSet::new();
    sinks.push(Box::new(StatsSink::new(config.source.fps as u64)));
    if let Some(dir) = &args.heightmaps {
        sinks.push(Box::new(HeightmapSink::new(dir, args.heightmap_every)?));
    }
    if let Some(path) = &args.dump {
        sinks.push(Box::new(RawDumpSink::create(path)?));
    }

    let beats = pipeline.subscribe_beats();
    let step_s = config.source.frame_step_s();

    println!("Bandwave");
    println!("  Frames: {}", args.frames);
    println!("  Resolution: {}", config.mesh.resolution);
    println!("  Spectrum: {} bins", config.source.spectrum_len);
    println!("  Workers: {}", pipeline.dispatcher().worker_count());

    let start = Instant::now();
    let mut presented = 0u64;
    let mut discarded = 0u64;
    let mut beat_frames = 0u64;
    let mut compute_time = Duration::ZERO;

    for frame in 0..args.frames {
        if let Some((at, resolution)) = args.resize_at {
            if frame == at {
                if let Err(e) = pipeline.set_resolution(resolution) {
                    warn!("Resize to {} rejected: {}", resolution, e);
                }
            }
        }

        let time_s = frame as f32 * step_s;
        match pipeline.run_frame(provider.as_mut(), &mut sinks, time_s, step_s)? {
            FrameOutcome::Presented(report) => {
                presented += 1;
                compute_time += report.analyze + report.animate;
            }
            FrameOutcome::Discarded => discarded += 1,
            FrameOutcome::EndOfStream => {
                info!("Source ended after {} frames", frame);
                break;
            }
        }

        if let Ok(BeatEvent { frame, bands }) = beats.try_recv() {
            beat_frames += 1;
            let list: Vec<usize> = bands.iter().collect();
            info!("Beat at frame {}: bands {:?}", frame, list);
        }
    }

    let elapsed = start.elapsed();
    println!("  Presented: {}", presented);
    println!("  Discarded: {}", discarded);
    println!("  Beat frames: {}", beat_frames);
    if presented > 0 {
        println!(
            "  Compute: {:.3}ms/frame",
            compute_time.as_secs_f64() * 1000.0 / presented as f64
        );
    }
    println!("  Time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
