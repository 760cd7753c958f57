//! Per-band filter state and the views handed to later stages.

use super::bands::NUM_BANDS;

/// Carried state for one band
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BandState {
    /// Unsmoothed value committed by the last step
    pub raw_mean: f32,
    /// Exponentially smoothed value
    pub smoothed_mean: f32,
    /// Beat flag from the last step; valid for one frame
    pub beat: bool,
}

impl BandState {
    /// Advance one step over the band's bin window
    ///
    /// `blend` is the smoothing weight `1 - smoothness^dt` shared by every band
    /// in the same call.
    pub fn step(&mut self, window: &[f32], peak_influence: f32, blend: f32, beat_threshold: f32) {
        let (mean, peak) = mean_and_peak(window);
        let raw = lerp(mean, peak, peak_influence);

        self.beat = raw - self.raw_mean >= beat_threshold;
        self.smoothed_mean = lerp(self.smoothed_mean, raw, blend);
        self.raw_mean = raw;
    }
}

/// Arithmetic mean and maximum of a window; an empty window reads as silence
fn mean_and_peak(window: &[f32]) -> (f32, f32) {
    let count = window.len().max(1);
    let (sum, peak) = window
        .iter()
        .fold((0.0f32, 0.0f32), |(sum, peak), &m| (sum + m, peak.max(m)));
    (sum / count as f32, peak)
}

/// Exact at both ends: `t == 0` yields `a`, `t == 1` yields `b`
#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Smoothed band means, the only analyzer output the mesh consumes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BandMeans([f32; NUM_BANDS]);

impl BandMeans {
    pub fn new(means: [f32; NUM_BANDS]) -> Self {
        Self(means)
    }

    /// Same value in every band
    pub fn splat(value: f32) -> Self {
        Self([value; NUM_BANDS])
    }

    pub fn get(&self, band: usize) -> f32 {
        self.0[band]
    }

    pub fn as_array(&self) -> &[f32; NUM_BANDS] {
        &self.0
    }
}

impl Default for BandMeans {
    fn default() -> Self {
        Self::splat(0.0)
    }
}

/// Set of band indices that flagged a beat in one frame (one bit per band)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BeatSet(u32);

impl BeatSet {
    pub const EMPTY: BeatSet = BeatSet(0);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn insert(&mut self, band: usize) {
        debug_assert!(band < NUM_BANDS);
        self.0 |= 1 << band;
    }

    pub fn contains(&self, band: usize) -> bool {
        band < NUM_BANDS && self.0 & (1 << band) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Flagged band indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..NUM_BANDS).filter(move |&band| bits & (1 << band) != 0)
    }
}

impl FromIterator<usize> for BeatSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BeatSet::EMPTY;
        for band in iter {
            set.insert(band);
        }
        set
    }
}
