//! WAV-file spectrum provider: slides an FFT window through the file at the frame rate.

use std::path::Path;

use tracing::debug;

use super::fft::MagnitudeFft;
use crate::error::{PipelineError, Result};
use crate::pipeline::SpectrumProvider;
use crate::spectrum::SpectrumSample;

/// Decoded mono signal read one window per frame
pub struct WavSpectrum {
    fft: MagnitudeFft,
    signal: Vec<f32>,
    window: Vec<f32>,
    sample_rate_hz: u32,
    hop: usize,
    position: usize,
}

impl WavSpectrum {
    /// Decode `path`, mixing all channels to mono
    pub fn open(path: impl AsRef<Path>, spectrum_len: usize, fps: u32) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let signal: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        debug!(
            "Loaded {}: {} Hz, {} channel(s), {:.2}s",
            path.display(),
            spec.sample_rate,
            spec.channels,
            signal.len() as f32 / spec.sample_rate.max(1) as f32
        );

        Self::from_samples(signal, spec.sample_rate, spectrum_len, fps)
    }

    /// Wrap an already decoded mono signal
    pub fn from_samples(
        signal: Vec<f32>,
        sample_rate_hz: u32,
        spectrum_len: usize,
        fps: u32,
    ) -> Result<Self> {
        if sample_rate_hz == 0 {
            return Err(PipelineError::Source("WAV sample rate is zero".into()));
        }
        let fft = MagnitudeFft::new(spectrum_len);
        let window = vec![0.0; fft.window_len()];
        Ok(Self {
            fft,
            signal,
            window,
            sample_rate_hz,
            hop: (sample_rate_hz / fps.max(1)).max(1) as usize,
            position: 0,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Seconds of audio remaining
    pub fn remaining_s(&self) -> f32 {
        self.signal.len().saturating_sub(self.position) as f32 / self.sample_rate_hz as f32
    }
}

impl SpectrumProvider for WavSpectrum {
    fn fill(&mut self, spectrum: &mut SpectrumSample) -> Result<bool> {
        if self.position >= self.signal.len() {
            return Ok(false);
        }
        if spectrum.len() != self.fft.spectrum_len() {
            return Err(PipelineError::Source(format!(
                "spectrum holds {} bins, WAV reader produces {}",
                spectrum.len(),
                self.fft.spectrum_len()
            )));
        }

        // Zero-pad the tail window
        let available = &self.signal[self.position..];
        let take = available.len().min(self.window.len());
        self.window[..take].copy_from_slice(&available[..take]);
        self.window[take..].fill(0.0);

        self.fft.process(&self.window, spectrum.magnitudes_mut());
        spectrum.set_sample_rate(self.sample_rate_hz as f32)?;
        self.position += self.hop;
        Ok(true)
    }
}
