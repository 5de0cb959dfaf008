//! This namespace contains all the parts converting from frequencies to wave data.

pub mod karplus;

use rand::Rng;
use snafu::Snafu;

pub use karplus::KarplusStrong;

/// A synthesizer turns a frequency into the waveform of a single plucked note.
pub trait Synthesizer {
    /// Render one note. Any randomness is drawn from `rng`, so that a seeded
    /// generator yields reproducible output.
    fn pluck<R: Rng + ?Sized>(&self, frequency: f64, rng: &mut R) -> Result<Vec<f64>, SynthError>;
}

/// Synthesis parameters outside of their valid interval.
#[derive(Debug, PartialEq, Snafu)]
pub enum SynthError {
    #[snafu(display("Smoothing factor {} is outside of [0, 1]", smoothing_factor))]
    InvalidSmoothingFactor { smoothing_factor: f64 },
    #[snafu(display(
        "Frequency {} Hz cannot be synthesized at {} Hz sample rate",
        frequency,
        sample_rate
    ))]
    InvalidFrequency { frequency: f64, sample_rate: u32 },
}
