//! Spectrum band analyzer: third-octave extraction, smoothing and beat detection.
//!
//! Each call reads a linear-magnitude spectrum and advances 32 independent band
//! filters in place. Bands share the spectrum read-only and write disjoint
//! state, so they are dispatched as one parallel batch.

mod bands;
mod state;

pub use bands::{hz_to_bin, BandTable, BAND_EDGE_FACTOR, NUM_BANDS};
pub use state::{BandMeans, BandState, BeatSet};

use tracing::{debug, trace};

use crate::dispatch::Dispatcher;
use crate::error::ConfigError;
use crate::params::AnalyzerParams;
use crate::spectrum::SpectrumSample;

/// Band analyzer owning the carried per-band state
pub struct Analyzer {
    table: &'static BandTable,
    params: AnalyzerParams,
    states: [BandState; NUM_BANDS],
}

impl Analyzer {
    /// Create an analyzer over the process-wide third-octave table
    pub fn new(params: AnalyzerParams) -> Result<Self, ConfigError> {
        Self::with_table(BandTable::third_octave(), params)
    }

    pub fn with_table(table: &'static BandTable, params: AnalyzerParams) -> Result<Self, ConfigError> {
        params.validate()?;
        debug!(
            "Analyzer created: bands={}, peak_influence={}, smoothness={}, beat_threshold={}",
            table.len(),
            params.peak_influence,
            params.smoothness,
            params.beat_threshold
        );
        Ok(Self {
            table,
            params,
            states: [BandState::default(); NUM_BANDS],
        })
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    pub fn table(&self) -> &'static BandTable {
        self.table
    }

    /// Replace tuning parameters; carried band state is kept
    pub fn set_params(&mut self, params: AnalyzerParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Zero every band's carried state
    pub fn reset(&mut self) {
        self.states = [BandState::default(); NUM_BANDS];
    }

    /// Convenience wrapper over [`Analyzer::compute`] for a [`SpectrumSample`]
    pub fn analyze(
        &mut self,
        dispatcher: &Dispatcher,
        spectrum: &SpectrumSample,
        dt_s: f32,
    ) -> BandResults<'_> {
        self.compute(dispatcher, spectrum.magnitudes(), spectrum.sample_rate_hz(), dt_s)
    }

    /// Advance every band by one step
    ///
    /// # Arguments
    /// * `magnitudes` - Linear magnitudes spanning 0..sample_rate/2
    /// * `sample_rate_hz` - Sample rate the spectrum was taken at
    /// * `dt_s` - Real time since the previous call (seconds, negative treated as 0)
    pub fn compute(
        &mut self,
        dispatcher: &Dispatcher,
        magnitudes: &[f32],
        sample_rate_hz: f32,
        dt_s: f32,
    ) -> BandResults<'_> {
        let AnalyzerParams {
            peak_influence,
            smoothness,
            beat_threshold,
        } = self.params;
        let blend = smoothing_blend(smoothness, dt_s);
        let table = self.table;

        if magnitudes.is_empty() {
            // Nothing to read: every band sees silence
            for state in &mut self.states {
                state.step(&[], peak_influence, blend, beat_threshold);
            }
        } else {
            dispatcher.for_each_mut(&mut self.states, |band, state| {
                let bins = table.bin_range(band, sample_rate_hz, magnitudes.len());
                state.step(&magnitudes[bins], peak_influence, blend, beat_threshold);
            });
        }

        trace!("Analyzer step: dt={:.4}s blend={:.4}", dt_s, blend);
        BandResults {
            states: &self.states,
        }
    }

    /// Read-only view of the state committed by the last step
    pub fn results(&self) -> BandResults<'_> {
        BandResults {
            states: &self.states,
        }
    }
}

/// Weight given to the new sample: `1 - smoothness^dt`
///
/// Frame-rate independent: two steps of `dt/2` decay exactly as much as one of `dt`.
pub fn smoothing_blend(smoothness: f32, dt_s: f32) -> f32 {
    let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
    (1.0 - smoothness.powf(dt_s)).clamp(0.0, 1.0)
}

/// Read-only view of the band state after a compute step
#[derive(Clone, Copy, Debug)]
pub struct BandResults<'a> {
    states: &'a [BandState; NUM_BANDS],
}

impl<'a> BandResults<'a> {
    pub fn states(&self) -> &'a [BandState; NUM_BANDS] {
        self.states
    }

    pub fn smoothed_means(&self) -> BandMeans {
        BandMeans::new(std::array::from_fn(|band| self.states[band].smoothed_mean))
    }

    pub fn raw_means(&self) -> [f32; NUM_BANDS] {
        std::array::from_fn(|band| self.states[band].raw_mean)
    }

    pub fn beats(&self) -> BeatSet {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.beat)
            .map(|(band, _)| band)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DispatchParams;

    const SAMPLE_RATE: f32 = 44100.0;
    const LEN: usize = 8192;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&DispatchParams {
            worker_threads: 2,
            parallel_threshold: 1,
        })
        .unwrap()
    }

    fn analyzer(smoothness: f32) -> Analyzer {
        Analyzer::new(AnalyzerParams {
            peak_influence: 0.25,
            smoothness,
            beat_threshold: 0.2,
        })
        .unwrap()
    }

    #[test]
    fn test_smoothing_blend() {
        assert_eq!(smoothing_blend(0.0, 0.016), 1.0);
        assert_eq!(smoothing_blend(0.5, 0.0), 0.0);
        assert_eq!(smoothing_blend(0.5, -1.0), 0.0);
        assert!((smoothing_blend(0.5, 1.0) - 0.5).abs() < 1e-6);
        // Two half steps retain the same fraction as one full step
        let half = 1.0 - smoothing_blend(0.3, 0.5);
        let full = 1.0 - smoothing_blend(0.3, 1.0);
        assert!((half * half - full).abs() < 1e-6);
    }

    #[test]
    fn test_constant_spectrum_converges() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.4);
        let spectrum = vec![0.75f32; LEN];

        for _ in 0..400 {
            analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.1);
        }

        for state in analyzer.results().states() {
            assert!((state.smoothed_mean - 0.75).abs() < 1e-4);
            assert!((state.raw_mean - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_smoothness_tracks_raw_exactly() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.0);
        let mut spectrum = vec![0.0f32; LEN];

        for frame in 0..5 {
            for (i, m) in spectrum.iter_mut().enumerate() {
                *m = ((i * 7 + frame * 13) % 11) as f32 * 0.1;
            }
            let results = analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.016);
            for state in results.states() {
                assert_eq!(state.smoothed_mean, state.raw_mean);
            }
        }
    }

    #[test]
    fn test_silence_settles_without_beats() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.5);
        let spectrum = vec![0.0f32; LEN];

        for _ in 0..10 {
            let results = analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.016);
            assert!(results.beats().is_empty());
        }
        assert!(analyzer.results().raw_means().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_step_increase_flags_only_the_touched_band() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.5);
        let table = BandTable::third_octave();
        let mut spectrum = vec![0.0f32; LEN];

        analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.016);

        // Raise the bins unique to the 1 kHz band: past the 800 Hz window, before the 1250 Hz one
        let band = 18;
        assert_eq!(table.center_hz(band), 1000.0);
        let below = table.bin_range(band - 1, SAMPLE_RATE, LEN);
        let above = table.bin_range(band + 1, SAMPLE_RATE, LEN);
        for bin in (*below.end() + 1)..*above.start() {
            spectrum[bin] = 1.0;
        }

        let results = analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.016);
        assert_eq!(results.beats().iter().collect::<Vec<_>>(), vec![band]);

        // Holding the level is not a rise
        let results = analyzer.compute(&dispatcher, &spectrum, SAMPLE_RATE, 0.016);
        assert!(results.beats().is_empty());
    }

    #[test]
    fn test_reset_clears_state() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.5);
        analyzer.compute(&dispatcher, &vec![1.0; LEN], SAMPLE_RATE, 0.016);
        analyzer.reset();
        assert!(analyzer
            .results()
            .states()
            .iter()
            .all(|s| *s == BandState::default()));
    }

    #[test]
    fn test_empty_spectrum_is_silence() {
        let dispatcher = dispatcher();
        let mut analyzer = analyzer(0.0);
        let results = analyzer.compute(&dispatcher, &[], SAMPLE_RATE, 0.016);
        assert!(results.beats().is_empty());
        assert_eq!(results.smoothed_means(), BandMeans::default());
    }

    #[test]
    fn test_invalid_params_rejected_at_setup() {
        let result = Analyzer::new(AnalyzerParams {
            smoothness: 1.5,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
