// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The options recognized when turning notes into positions and audio.

use crate::fretboard::{self, TuningTable};
use crate::note::Note;
use crate::play;
use crate::synth::karplus;
use crate::wave;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Number of samples per second.
    pub sample_rate: u32,
    /// Karplus-Strong blend between wavetable and previous output, in [0, 1].
    pub smoothing_factor: f64,
    /// Length of every plucked note in seconds.
    pub window_seconds: f64,
    /// Silence before the first note in milliseconds.
    pub padding_ms: f64,
    /// Open strings from the lowest string up.
    pub open_strings: Vec<Note>,
    pub max_fret: usize,
}

impl RenderConfig {
    /// Number of samples generated for each plucked note.
    pub fn window_samples(&self) -> usize {
        (self.window_seconds * self.sample_rate as f64).round() as usize
    }

    pub fn tuning_table(&self) -> TuningTable {
        TuningTable::new(self.open_strings.clone(), self.max_fret)
    }
}

/// 44.1 kHz, two second notes, standard guitar tuning with 21 frets.
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: wave::SAMPLE_RATE,
            smoothing_factor: karplus::DEFAULT_SMOOTHING_FACTOR,
            window_seconds: karplus::DEFAULT_WINDOW_SECONDS as f64,
            padding_ms: play::ONSET_PADDING_MS,
            open_strings: fretboard::standard_tuning(),
            max_fret: fretboard::DEFAULT_MAX_FRET,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.window_samples(), 88200);
        let table = config.tuning_table();
        assert_eq!(table.string_count(), 6);
        assert_eq!(table.max_fret(), 21);
    }

    #[test]
    fn custom_instrument() {
        let config = RenderConfig {
            open_strings: vec![
                "E1".parse().unwrap(),
                "A1".parse().unwrap(),
                "D2".parse().unwrap(),
                "G2".parse().unwrap(),
            ],
            max_fret: 24,
            window_seconds: 0.5,
            sample_rate: 8000,
            ..RenderConfig::default()
        };
        assert_eq!(config.window_samples(), 4000);
        let bass = config.tuning_table();
        assert_eq!(bass.string_count(), 4);
        assert_eq!(
            bass.position_to_note(fretboard::FretboardPosition::new(4, 24)),
            Ok("G4".parse().unwrap())
        );
    }
}
