//! Deterministic test signal: a few steady tones over a pulsing kick drum.

use super::fft::MagnitudeFft;
use crate::error::{PipelineError, Result};
use crate::pipeline::SpectrumProvider;
use crate::spectrum::SpectrumSample;

/// Steady partials (Hz, amplitude)
const TONES: [(f32, f32); 4] = [(110.0, 0.25), (440.0, 0.2), (1760.0, 0.12), (5000.0, 0.06)];

/// Kick pitch (Hz)
const KICK_HZ: f32 = 55.0;

/// Kick amplitude decay rate (1/s)
const KICK_DECAY: f32 = 14.0;

/// Generated spectrum advancing one frame per call
pub struct SyntheticSpectrum {
    fft: MagnitudeFft,
    samples: Vec<f32>,
    sample_rate_hz: u32,
    hop: usize,
    kick_period_s: f32,
    position: u64,
}

impl SyntheticSpectrum {
    /// # Arguments
    /// * `spectrum_len` - Bins per frame (the FFT window is twice this)
    /// * `sample_rate_hz` - Rate the signal is synthesized at
    /// * `fps` - Frames per second, sets the hop between windows
    /// * `bpm` - Kick tempo
    pub fn new(spectrum_len: usize, sample_rate_hz: u32, fps: u32, bpm: f32) -> Self {
        let fft = MagnitudeFft::new(spectrum_len);
        let samples = vec![0.0; fft.window_len()];
        Self {
            fft,
            samples,
            sample_rate_hz,
            hop: (sample_rate_hz / fps.max(1)).max(1) as usize,
            kick_period_s: 60.0 / bpm.max(1.0),
            position: 0,
        }
    }

    /// Signal value at `t` seconds
    ///
    /// Phase is evaluated in f64 so long runs keep sub-sample resolution.
    pub fn sample_at(&self, t: f64) -> f32 {
        let tau = std::f64::consts::TAU;
        let tones: f64 = TONES
            .iter()
            .map(|&(hz, amp)| amp as f64 * (tau * hz as f64 * t).sin())
            .sum();

        let since_kick = t.rem_euclid(self.kick_period_s as f64);
        let envelope = (-(KICK_DECAY as f64) * since_kick).exp();
        let kick = envelope * (tau * KICK_HZ as f64 * since_kick).sin();

        (tones + 0.6 * kick) as f32
    }
}

impl SpectrumProvider for SyntheticSpectrum {
    fn fill(&mut self, spectrum: &mut SpectrumSample) -> Result<bool> {
        if spectrum.len() != self.fft.spectrum_len() {
            return Err(PipelineError::Source(format!(
                "spectrum holds {} bins, synthesizer produces {}",
                spectrum.len(),
                self.fft.spectrum_len()
            )));
        }

        let rate = self.sample_rate_hz as f64;
        let start = self.position;
        let mut samples = std::mem::take(&mut self.samples);
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = self.sample_at((start + i as u64) as f64 / rate);
        }
        self.fft.process(&samples, spectrum.magnitudes_mut());
        self.samples = samples;

        spectrum.set_sample_rate(self.sample_rate_hz as f32)?;
        self.position += self.hop as u64;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_across_instances() {
        let mut a = SyntheticSpectrum::new(512, 22050, 30, 120.0);
        let mut b = SyntheticSpectrum::new(512, 22050, 30, 120.0);
        let mut sa = SpectrumSample::new(512, 1.0).unwrap();
        let mut sb = SpectrumSample::new(512, 1.0).unwrap();

        for _ in 0..3 {
            assert!(a.fill(&mut sa).unwrap());
            assert!(b.fill(&mut sb).unwrap());
            assert_eq!(sa.magnitudes(), sb.magnitudes());
        }
        assert_eq!(sa.sample_rate_hz(), 22050.0);
    }

    #[test]
    fn test_tone_energy_present() {
        let mut source = SyntheticSpectrum::new(1024, 44100, 60, 120.0);
        let mut spectrum = SpectrumSample::new(1024, 44100.0).unwrap();
        source.fill(&mut spectrum).unwrap();

        // 440 Hz -> bin 440 / 44100 * 2048 ~ 20.4
        let near_440 = spectrum.magnitudes()[19..=22]
            .iter()
            .cloned()
            .fold(0.0f32, f32::max);
        let quiet = spectrum.magnitudes()[600];
        assert!(near_440 > 0.05);
        assert!(near_440 > 10.0 * quiet);
    }

    #[test]
    fn test_late_samples_keep_phase_resolution() {
        let source = SyntheticSpectrum::new(512, 44100, 60, 120.0);
        // Ten minutes in, adjacent samples must still differ
        let start = 600 * 44100u64;
        let a = source.sample_at(start as f64 / 44100.0);
        let b = source.sample_at((start + 1) as f64 / 44100.0);
        let c = source.sample_at((start + 2) as f64 / 44100.0);
        assert_ne!(a, b);
        assert_ne!(b, c);

        // Whole kick periods later the signal repeats (all tones are integer Hz)
        let early = source.sample_at(0.123);
        let late = source.sample_at(600.123);
        assert!((early - late).abs() < 1e-4);
    }

    #[test]
    fn test_length_mismatch_is_source_error() {
        let mut source = SyntheticSpectrum::new(512, 44100, 60, 120.0);
        let mut spectrum = SpectrumSample::new(1024, 44100.0).unwrap();
        assert!(matches!(
            source.fill(&mut spectrum),
            Err(PipelineError::Source(_))
        ));
    }
}
