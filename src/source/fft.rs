//! Windowed magnitude FFT shared by the demo spectrum providers.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Forward FFT of `2 * spectrum_len` samples, keeping the first `spectrum_len` magnitudes
pub struct MagnitudeFft {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    spectrum_len: usize,
    // Full-scale sine in the window reads as magnitude ~1
    gain: f32,
}

impl MagnitudeFft {
    pub fn new(spectrum_len: usize) -> Self {
        let window_len = spectrum_len * 2;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_len);
        let window: Vec<f32> = (0..window_len).map(|i| hann_window(i, window_len)).collect();
        let window_sum: f32 = window.iter().sum();
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); window_len],
            scratch,
            spectrum_len,
            gain: if window_sum > 0.0 { 2.0 / window_sum } else { 0.0 },
        }
    }

    pub fn spectrum_len(&self) -> usize {
        self.spectrum_len
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Window `samples` (length `window_len`) and write magnitudes into `out` (length `spectrum_len`)
    pub fn process(&mut self, samples: &[f32], out: &mut [f32]) {
        debug_assert_eq!(samples.len(), self.window.len());
        debug_assert_eq!(out.len(), self.spectrum_len);

        // Apply Hann window
        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (magnitude, bin) in out.iter_mut().zip(&self.buffer) {
            *magnitude = bin.norm() * self.gain;
        }
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
