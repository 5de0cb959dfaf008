// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Karplus-Strong synthesis of plucked strings.
//!
//! A wavetable filled with noise is played back in a loop while each entry is
//! replaced by a blend of itself and the previously emitted sample. This low pass
//! filter makes the noise decay into a pitched, string-like tone.

use log::trace;
use rand::Rng;

use super::{SynthError, Synthesizer};

/// Blend between the wavetable entry and the previous output used by default.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;

/// Length of every synthesized note in seconds.
pub const DEFAULT_WINDOW_SECONDS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct KarplusStrong {
    sample_rate: u32,
    /// Weight of the current wavetable entry, the previous output gets `1 - smoothing_factor`.
    smoothing_factor: f64,
    /// Number of samples generated for each note.
    num_samples: usize,
}

impl KarplusStrong {
    /// A synthesizer with the default smoothing factor, generating two seconds per note.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            num_samples: (DEFAULT_WINDOW_SECONDS * sample_rate) as usize,
        }
    }

    /// Change the smoothing factor, which must lie in the closed interval [0, 1].
    ///
    /// ```
    /// use fretsynth::synth::KarplusStrong;
    ///
    /// assert!(KarplusStrong::new(44100).with_smoothing_factor(0.3).is_ok());
    /// assert!(KarplusStrong::new(44100).with_smoothing_factor(1.5).is_err());
    /// ```
    pub fn with_smoothing_factor(mut self, smoothing_factor: f64) -> Result<Self, SynthError> {
        if !(0.0..=1.0).contains(&smoothing_factor) {
            return Err(SynthError::InvalidSmoothingFactor { smoothing_factor });
        }
        self.smoothing_factor = smoothing_factor;
        Ok(self)
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.smoothing_factor
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of wavetable entries for a frequency. Truncation means the
    /// synthesized pitch is only an approximation of `frequency`. Saturates at
    /// `usize::MAX` for vanishingly small frequencies.
    ///
    /// ```
    /// # use fretsynth::synth::KarplusStrong;
    /// assert_eq!(KarplusStrong::new(44100).wavetable_size(440.0), Ok(100));
    /// assert_eq!(KarplusStrong::new(44100).wavetable_size(82.41), Ok(535));
    /// ```
    pub fn wavetable_size(&self, frequency: f64) -> Result<usize, SynthError> {
        let invalid = || SynthError::InvalidFrequency {
            frequency,
            sample_rate: self.sample_rate,
        };
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(invalid());
        }
        let size = (self.sample_rate as f64 / frequency).floor() as usize;
        if size == 0 {
            return Err(invalid());
        }
        Ok(size)
    }

    /// Render a note of the given frequency.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        frequency: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>, SynthError> {
        let wavetable_size = self.wavetable_size(frequency)?;
        trace!(
            "plucking {:.2} Hz with a wavetable of {} samples",
            frequency,
            wavetable_size
        );

        // Entries past the window are never played, so they are not drawn either.
        let table_len = wavetable_size.min(self.num_samples);
        // Either -1 or 1, nothing in between.
        let mut wavetable: Vec<f64> = (0..table_len)
            .map(|_| if rng.gen::<bool>() { 1.0 } else { -1.0 })
            .collect();

        let a = self.smoothing_factor;
        let b = 1.0 - a;
        let mut signal = Vec::with_capacity(self.num_samples);
        let mut previous = 0.0;
        let mut current = 0;
        for _ in 0..self.num_samples {
            wavetable[current] = a * wavetable[current] + b * previous;
            previous = wavetable[current];
            signal.push(previous);
            current = (current + 1) % wavetable_size;
        }

        remove_dc_offset(&mut signal);
        Ok(signal)
    }
}

impl Default for KarplusStrong {
    fn default() -> Self {
        Self::new(crate::wave::SAMPLE_RATE)
    }
}

impl Synthesizer for KarplusStrong {
    fn pluck<R: Rng + ?Sized>(&self, frequency: f64, rng: &mut R) -> Result<Vec<f64>, SynthError> {
        self.synthesize(frequency, rng)
    }
}

/// Shift the signal so that its mean is zero.
fn remove_dc_offset(signal: &mut [f64]) {
    if signal.is_empty() {
        return;
    }
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    signal.iter_mut().for_each(|s| *s -= mean);
}

/// Render a note at the default sample rate, drawing the initial noise from the thread-local RNG.
pub fn karplus_strong(frequency: f64, smoothing_factor: f64) -> Result<Vec<f64>, SynthError> {
    KarplusStrong::default()
        .with_smoothing_factor(smoothing_factor)?
        .synthesize(frequency, &mut rand::thread_rng())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wave::SAMPLE_RATE;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn mean(signal: &[f64]) -> f64 {
        signal.iter().sum::<f64>() / signal.len() as f64
    }

    #[test]
    fn fixed_window_and_zero_mean() {
        for &frequency in &[82.41, 220.0, 440.0, 1318.5] {
            let signal = karplus_strong(frequency, DEFAULT_SMOOTHING_FACTOR).unwrap();
            assert_eq!(signal.len(), 2 * SAMPLE_RATE as usize);
            assert!(mean(&signal).abs() < 1e-9);
        }
    }

    #[test]
    fn smoothing_factor_bounds() {
        assert_eq!(
            karplus_strong(440.0, 1.5),
            Err(SynthError::InvalidSmoothingFactor {
                smoothing_factor: 1.5
            })
        );
        assert!(karplus_strong(440.0, -0.1).is_err());
        assert!(KarplusStrong::default()
            .with_smoothing_factor(std::f64::NAN)
            .is_err());
        assert!(karplus_strong(440.0, 0.0).is_ok());
        assert!(karplus_strong(440.0, 1.0).is_ok());
    }

    #[test]
    fn invalid_frequencies() {
        let synth = KarplusStrong::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for &frequency in &[0.0, -440.0, 50000.0, std::f64::INFINITY, std::f64::NAN] {
            assert!(synth.synthesize(frequency, &mut rng).is_err());
        }
    }

    #[test]
    fn wavetable_longer_than_window() {
        let synth = KarplusStrong::default().with_num_samples(16);
        assert_eq!(synth.wavetable_size(1e-15), Ok(usize::MAX));
        let tiny = synth
            .synthesize(1e-15, &mut Pcg32::seed_from_u64(0))
            .unwrap();
        assert_eq!(tiny.len(), 16);
        // Any wavetable of at least 16 entries never wraps within the window.
        let low = synth
            .synthesize(441.0, &mut Pcg32::seed_from_u64(0))
            .unwrap();
        assert_eq!(tiny, low);
    }

    #[test]
    fn seeded_output_is_reproducible() {
        let synth = KarplusStrong::default().with_num_samples(4096);
        let first = synth
            .synthesize(330.0, &mut Pcg32::seed_from_u64(42))
            .unwrap();
        let second = synth
            .synthesize(330.0, &mut Pcg32::seed_from_u64(42))
            .unwrap();
        let other = synth
            .synthesize(330.0, &mut Pcg32::seed_from_u64(43))
            .unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn first_period_matches_recurrence() {
        // With a = 1 the wavetable is never filtered, so the output repeats it exactly.
        let synth = KarplusStrong::new(8)
            .with_smoothing_factor(1.0)
            .unwrap()
            .with_num_samples(12);
        let signal = synth
            .synthesize(2.0, &mut Pcg32::seed_from_u64(7))
            .unwrap();
        let m = mean(&signal);
        for i in 0..8 {
            let raw = signal[i] + m;
            assert!((raw.abs() - 1.0).abs() < 1e-12);
            assert!((signal[i + 4] - signal[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn decays() {
        let synth = KarplusStrong::default();
        let signal = synth
            .synthesize(220.0, &mut Pcg32::seed_from_u64(3))
            .unwrap();
        let energy = |range: std::ops::Range<usize>| signal[range].iter().map(|s| s * s).sum::<f64>();
        assert!(energy(0..4410) > energy(80000..84410));
    }

    #[test]
    fn empty_window() {
        let synth = KarplusStrong::default().with_num_samples(0);
        let signal = synth
            .synthesize(440.0, &mut Pcg32::seed_from_u64(0))
            .unwrap();
        assert!(signal.is_empty());
    }
}
