//! Third-octave band table and frequency-to-bin mapping.

use std::ops::RangeInclusive;

/// Number of analysis bands
pub const NUM_BANDS: usize = 32;

/// Half-band edge factor, 2^(1/6)
///
/// Edges sit half a third-octave either side of each centre; adjacent windows
/// overlap by half a step because bins are floored independently.
pub const BAND_EDGE_FACTOR: f32 = 1.122_462;

/// Ordered band centre frequencies
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    centers_hz: [f32; NUM_BANDS],
}

/// ISO nominal third-octave centres, 16 Hz to 20 kHz
static THIRD_OCTAVE: BandTable = BandTable {
    centers_hz: [
        16.0, 20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0,
        315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0,
        4000.0, 5000.0, 6300.0, 8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
    ],
};

impl BandTable {
    /// Process-wide third-octave table
    pub fn third_octave() -> &'static BandTable {
        &THIRD_OCTAVE
    }

    pub fn len(&self) -> usize {
        NUM_BANDS
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn centers_hz(&self) -> &[f32; NUM_BANDS] {
        &self.centers_hz
    }

    pub fn center_hz(&self, band: usize) -> f32 {
        self.centers_hz[band]
    }

    /// Lower and upper edge frequency of `band` (Hz)
    pub fn edges_hz(&self, band: usize) -> (f32, f32) {
        let center = self.centers_hz[band];
        (center / BAND_EDGE_FACTOR, center * BAND_EDGE_FACTOR)
    }

    /// Inclusive bin window covered by `band`, clamped to the spectrum and never empty
    pub fn bin_range(
        &self,
        band: usize,
        sample_rate_hz: f32,
        spectrum_len: usize,
    ) -> RangeInclusive<usize> {
        let (lower_hz, upper_hz) = self.edges_hz(band);
        let lower = hz_to_bin(lower_hz, sample_rate_hz, spectrum_len);
        let upper = hz_to_bin(upper_hz, sample_rate_hz, spectrum_len).max(lower);
        lower..=upper
    }
}

/// Convert frequency (Hz) to a spectrum bin index, clamped to `[0, spectrum_len - 1]`
///
/// The spectrum spans 0..sample_rate/2, so each bin is `sample_rate / (2 * len)` Hz wide.
pub fn hz_to_bin(hz: f32, sample_rate_hz: f32, spectrum_len: usize) -> usize {
    let last = spectrum_len.saturating_sub(1);
    let bin = (hz / sample_rate_hz * 2.0 * spectrum_len as f32).floor();
    if bin.is_nan() || bin <= 0.0 {
        0
    } else {
        (bin as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ascending_third_octaves() {
        let table = BandTable::third_octave();
        assert_eq!(table.len(), NUM_BANDS);
        assert_eq!(table.center_hz(0), 16.0);
        assert_eq!(table.center_hz(NUM_BANDS - 1), 20000.0);

        for pair in table.centers_hz().windows(2) {
            let ratio = pair[1] / pair[0];
            // Nominal values round 2^(1/3) ≈ 1.26 loosely
            assert!(ratio > 1.2 && ratio < 1.32, "ratio {ratio}");
        }
    }

    #[test]
    fn test_edge_factor_is_sixth_octave() {
        assert!((BAND_EDGE_FACTOR - 2f32.powf(1.0 / 6.0)).abs() < 1e-6);
    }

    #[test]
    fn test_hz_to_bin() {
        // 44.1 kHz over 8192 bins: ~2.69 Hz per bin
        assert_eq!(hz_to_bin(0.0, 44100.0, 8192), 0);
        assert_eq!(hz_to_bin(2.7, 44100.0, 8192), 1);
        assert_eq!(hz_to_bin(22050.0, 44100.0, 8192), 8191);
        assert_eq!(hz_to_bin(30000.0, 44100.0, 8192), 8191);
        assert_eq!(hz_to_bin(-5.0, 44100.0, 8192), 0);
    }

    #[test]
    fn test_1khz_band_avoids_spectrum_ends() {
        let table = BandTable::third_octave();
        let band = table
            .centers_hz()
            .iter()
            .position(|&c| c == 1000.0)
            .unwrap();

        let range = table.bin_range(band, 44100.0, 8192);
        assert_eq!(*range.start(), 330);
        assert_eq!(*range.end(), 417);
        assert!(*range.start() > 0);
        assert!(*range.end() < 8191);
    }

    #[test]
    fn test_top_band_clamps_to_last_bin() {
        let table = BandTable::third_octave();
        let range = table.bin_range(NUM_BANDS - 1, 44100.0, 8192);
        assert_eq!(*range.end(), 8191);
        assert!(range.start() <= range.end());
    }

    #[test]
    fn test_low_bands_collapse_on_short_spectra() {
        let table = BandTable::third_octave();
        // 64 bins at 44.1 kHz are ~345 Hz wide: the lowest bands all land in bin 0
        let range = table.bin_range(0, 44100.0, 64);
        assert_eq!(range, 0..=0);
    }
}
