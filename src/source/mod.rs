//! Spectrum providers for running the pipeline without a live audio host.

mod fft;
mod synthetic;
mod wav;

pub use fft::{hann_window, MagnitudeFft};
pub use synthetic::SyntheticSpectrum;
pub use wav::WavSpectrum;
