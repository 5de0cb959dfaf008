// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

/// Number of samples per second used unless configured otherwise.
pub const SAMPLE_RATE: u32 = 44100;

/// Index of the first sample at or after a point in time given in milliseconds.
///
/// ```
/// use fretsynth::wave::milliseconds_to_samples;
///
/// assert_eq!(milliseconds_to_samples(1000.0, 44100), 44100);
/// assert_eq!(milliseconds_to_samples(100.0, 44100), 4410);
/// assert_eq!(milliseconds_to_samples(0.01, 44100), 1);
/// ```
pub fn milliseconds_to_samples(milliseconds: f64, sample_rate: u32) -> usize {
    (milliseconds * sample_rate as f64 / 1000.0).ceil() as usize
}

/// Largest number of `f64` samples a single allocation can hold.
pub const MAX_SAMPLES: usize = std::isize::MAX as usize / std::mem::size_of::<f64>();

/// Same as [`milliseconds_to_samples`], but `None` for negative or non-finite times
/// and for times too far out to be indexed in a buffer.
///
/// ```
/// use fretsynth::wave::checked_milliseconds_to_samples;
///
/// assert_eq!(checked_milliseconds_to_samples(100.0, 44100), Some(4410));
/// assert_eq!(checked_milliseconds_to_samples(-5.0, 44100), None);
/// assert_eq!(checked_milliseconds_to_samples(1e20, 44100), None);
/// ```
pub fn checked_milliseconds_to_samples(milliseconds: f64, sample_rate: u32) -> Option<usize> {
    let samples = (milliseconds * sample_rate as f64 / 1000.0).ceil();
    if milliseconds >= 0.0 && samples < MAX_SAMPLES as f64 {
        Some(samples as usize)
    } else {
        None
    }
}

/// A buffer holding mono floating point audio data at a fixed sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f64>,
}

#[allow(clippy::len_without_is_empty)]
impl AudioBuffer {
    /// A silent buffer of the given length.
    pub fn new(sample_rate: u32, sample_count: usize) -> Self {
        Self {
            sample_rate,
            samples: vec![0.0; sample_count],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Size of the buffer in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * std::mem::size_of::<f64>()
    }

    /// Length of the buffer in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Add `signal` onto the buffer, starting at sample `offset`.
    /// Whatever does not fit into the buffer anymore is dropped.
    ///
    /// Returns the number of samples that were actually added.
    ///
    /// ```
    /// use fretsynth::wave::AudioBuffer;
    ///
    /// let mut buffer = AudioBuffer::new(8, 4);
    /// assert_eq!(buffer.add_at(1, &[1.0, 1.0]), 2);
    /// assert_eq!(buffer.add_at(2, &[0.5, 0.5, 0.5]), 2);
    /// assert_eq!(buffer.samples(), &[0.0, 1.0, 1.5, 0.5]);
    /// assert_eq!(buffer.add_at(10, &[1.0]), 0);
    /// ```
    pub fn add_at(&mut self, offset: usize, signal: &[f64]) -> usize {
        if offset >= self.samples.len() {
            return 0;
        }
        let target = &mut self.samples[offset..];
        let mut added = 0;
        for (out, sample) in target.iter_mut().zip(signal) {
            *out += sample;
            added += 1;
        }
        added
    }

    /// Copy the `f64` samples to little-endian bytes.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of input samples if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(8)) {
            target.copy_from_slice(&sample.to_le_bytes());
            processed += 1;
        }
        processed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn byte_layout() {
        let mut buffer = AudioBuffer::new(SAMPLE_RATE, 3);
        buffer.add_at(1, &[0.25, -1.0]);
        let mut bytes = vec![0u8; buffer.byte_len()];
        assert_eq!(buffer.copy_bytes_to(&mut bytes), 3);
        assert_eq!(&bytes[8..16], &0.25f64.to_le_bytes());
        assert_eq!(&bytes[16..24], &(-1.0f64).to_le_bytes());

        let mut short = vec![0u8; 12];
        assert_eq!(buffer.copy_bytes_to(&mut short), 1);
    }

    #[test]
    fn silence() {
        let buffer = AudioBuffer::new(SAMPLE_RATE, SAMPLE_RATE as usize / 2);
        assert_eq!(buffer.duration(), 0.5);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn sample_counts_that_fit() {
        assert_eq!(checked_milliseconds_to_samples(0.0, SAMPLE_RATE), Some(0));
        assert_eq!(
            checked_milliseconds_to_samples(2500.0, SAMPLE_RATE),
            Some(milliseconds_to_samples(2500.0, SAMPLE_RATE))
        );
        assert_eq!(checked_milliseconds_to_samples(std::f64::NAN, SAMPLE_RATE), None);
        assert_eq!(checked_milliseconds_to_samples(std::f64::INFINITY, SAMPLE_RATE), None);
        assert_eq!(checked_milliseconds_to_samples(1e300, SAMPLE_RATE), None);
    }
}
