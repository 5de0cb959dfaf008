// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Scheduling plucked notes at onset times and mixing them into one buffer.

use log::{debug, trace};
use rand::Rng;
use snafu::{ResultExt, Snafu};

use crate::config::RenderConfig;
use crate::synth::{KarplusStrong, SynthError, Synthesizer};
use crate::wave::{self, AudioBuffer};

/// Silence before the first onset, in milliseconds.
pub const ONSET_PADDING_MS: f64 = 100.0;

#[derive(Debug, PartialEq, Snafu)]
pub enum MixError {
    #[snafu(display(
        "{} frequencies need {} onsets, got {}",
        frequencies,
        frequencies + 1,
        onsets
    ))]
    LengthMismatch { frequencies: usize, onsets: usize },
    #[snafu(display("Tempo of {} BPM is not positive", bpm))]
    InvalidTempo { bpm: f64 },
    #[snafu(display("Onset at {} ms is not a valid time", onset))]
    InvalidOnset { onset: f64 },
    #[snafu(display("Could not synthesize note: {}", source))]
    Synthesis { source: SynthError },
}

/// Duration of one beat in milliseconds.
pub fn bpm_to_milliseconds(bpm: f64) -> f64 {
    60_000.0 / bpm
}

/// Evenly spaced onsets of `num_beats` beats, plus one more marking the end of the last beat.
///
/// # Examples
///
/// ```
/// use fretsynth::play::bpm_to_onsets;
///
/// assert_eq!(bpm_to_onsets(120.0, 3, 100.0), Ok(vec![100.0, 600.0, 1100.0, 1600.0]));
/// assert!(bpm_to_onsets(0.0, 3, 100.0).is_err());
/// ```
pub fn bpm_to_onsets(bpm: f64, num_beats: usize, padding_ms: f64) -> Result<Vec<f64>, MixError> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(MixError::InvalidTempo { bpm });
    }
    let beat = bpm_to_milliseconds(bpm);
    Ok((0..=num_beats)
        .map(|i| padding_ms + i as f64 * beat)
        .collect())
}

/// Renders each note with a synthesizer and adds it into a shared buffer at its onset.
#[derive(Debug, Clone)]
pub struct OnsetMixer<S = KarplusStrong> {
    sample_rate: u32,
    synth: S,
}

impl OnsetMixer<KarplusStrong> {
    /// A mixer plucking strings with the default Karplus-Strong parameters.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_synth(sample_rate, KarplusStrong::new(sample_rate))
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self, MixError> {
        let synth = KarplusStrong::new(config.sample_rate)
            .with_smoothing_factor(config.smoothing_factor)
            .context(Synthesis)?
            .with_num_samples(config.window_samples());
        Ok(Self::with_synth(config.sample_rate, synth))
    }
}

impl Default for OnsetMixer<KarplusStrong> {
    fn default() -> Self {
        Self::new(wave::SAMPLE_RATE)
    }
}

impl<S: Synthesizer> OnsetMixer<S> {
    pub fn with_synth(sample_rate: u32, synth: S) -> Self {
        Self { sample_rate, synth }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    /// Pluck `frequencies[i]` at `onsets[i]` (in milliseconds). The last onset
    /// only marks the end of the buffer, so there must be exactly one onset more
    /// than frequencies. Notes ringing past the end are cut off, notes ringing
    /// into the next one are added up.
    pub fn pluck_strings<R: Rng + ?Sized>(
        &self,
        frequencies: &[f64],
        onsets: &[f64],
        rng: &mut R,
    ) -> Result<AudioBuffer, MixError> {
        if onsets.len() != frequencies.len() + 1 {
            return Err(MixError::LengthMismatch {
                frequencies: frequencies.len(),
                onsets: onsets.len(),
            });
        }
        let starts = onsets
            .iter()
            .map(|&onset| {
                wave::checked_milliseconds_to_samples(onset, self.sample_rate)
                    .ok_or(MixError::InvalidOnset { onset })
            })
            .collect::<Result<Vec<usize>, MixError>>()?;

        let num_samples = starts[starts.len() - 1];
        let mut output = AudioBuffer::new(self.sample_rate, num_samples);
        debug!(
            "mixing {} notes into {} samples ({:.2} seconds)",
            frequencies.len(),
            num_samples,
            output.duration()
        );

        for (&start, &frequency) in starts.iter().zip(frequencies) {
            let component = self.synth.pluck(frequency, rng).context(Synthesis)?;
            let added = output.add_at(start, &component);
            trace!(
                "{:7}: pluck {:.2} Hz, {} of {} samples",
                start,
                frequency,
                added,
                component.len()
            );
        }

        Ok(output)
    }

    /// Pluck one note per beat at the given tempo, after `padding_ms` of silence.
    pub fn pluck_at_tempo<R: Rng + ?Sized>(
        &self,
        frequencies: &[f64],
        bpm: f64,
        padding_ms: f64,
        rng: &mut R,
    ) -> Result<AudioBuffer, MixError> {
        let onsets = bpm_to_onsets(bpm, frequencies.len(), padding_ms)?;
        self.pluck_strings(frequencies, &onsets, rng)
    }
}

/// Mix plucked strings at the default sample rate using the thread-local RNG.
pub fn pluck_strings(frequencies: &[f64], onsets: &[f64]) -> Result<AudioBuffer, MixError> {
    OnsetMixer::new(wave::SAMPLE_RATE).pluck_strings(frequencies, onsets, &mut rand::thread_rng())
}
