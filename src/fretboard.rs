// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Mapping between positions on the fretboard of a stringed instrument and notes.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use snafu::Snafu;

use crate::note::{Note, PitchClass, SEMITONES_PER_OCTAVE};

/// Number of frets of a typical electric guitar.
pub const DEFAULT_MAX_FRET: usize = 21;

/// A place where a note can be played: a string (counted from 1) and a fret,
/// where fret 0 is the open string.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FretboardPosition {
    pub string: usize,
    pub fret: usize,
}

impl FretboardPosition {
    pub fn new(string: usize, fret: usize) -> Self {
        Self { string, fret }
    }
}

impl fmt::Display for FretboardPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.string, self.fret)
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum PositionError {
    #[snafu(display("String {} does not exist, must be within 1..={}", string, string_count))]
    StringOutOfRange { string: usize, string_count: usize },
    #[snafu(display("Fret {} does not exist, must be within 0..={}", fret, max_fret))]
    FretOutOfRange { fret: usize, max_fret: usize },
}

/// Lookup tables between every position of a fretboard and the note played there,
/// computed once from the notes of the open strings.
///
/// # Examples
///
/// ```
/// use fretsynth::fretboard::*;
/// use fretsynth::note::*;
///
/// let table = TuningTable::standard();
/// let a2 = Note::new(PitchClass::A, 2);
/// assert_eq!(table.position_to_note(FretboardPosition::new(1, 5)), Ok(a2));
/// assert_eq!(
///     table.note_to_positions(a2),
///     &[FretboardPosition::new(1, 5), FretboardPosition::new(2, 0)]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TuningTable {
    open_strings: Vec<Note>,
    max_fret: usize,
    position_to_note: BTreeMap<FretboardPosition, Note>,
    note_to_positions: BTreeMap<Note, Vec<FretboardPosition>>,
}

impl TuningTable {
    /// Build the lookup tables for the given open strings, where the first
    /// entry is string 1, and frets `0..=max_fret`.
    pub fn new(open_strings: Vec<Note>, max_fret: usize) -> Self {
        let mut position_to_note = BTreeMap::new();
        let mut note_to_positions: BTreeMap<Note, Vec<FretboardPosition>> = BTreeMap::new();

        for (string_index, open) in open_strings.iter().enumerate() {
            let open_index = open.pitch_class.index();
            for fret in 0..=max_fret {
                let semitones = open_index + fret as i32;
                let note = Note::new(
                    PitchClass::from_index(semitones),
                    open.octave + semitones / SEMITONES_PER_OCTAVE,
                );
                let position = FretboardPosition::new(string_index + 1, fret);
                position_to_note.insert(position, note);
                // The same note can be played at several positions.
                note_to_positions.entry(note).or_default().push(position);
            }
        }

        debug!(
            "built tuning table for {} strings and {} frets: {} positions, {} distinct notes",
            open_strings.len(),
            max_fret,
            position_to_note.len(),
            note_to_positions.len()
        );

        Self {
            open_strings,
            max_fret,
            position_to_note,
            note_to_positions,
        }
    }

    /// Standard guitar tuning E2 A2 D3 G3 B3 E4 with 21 frets.
    pub fn standard() -> Self {
        Self::new(standard_tuning(), DEFAULT_MAX_FRET)
    }

    pub fn string_count(&self) -> usize {
        self.open_strings.len()
    }

    pub fn max_fret(&self) -> usize {
        self.max_fret
    }

    pub fn open_strings(&self) -> &[Note] {
        &self.open_strings
    }

    fn check_bounds(&self, position: FretboardPosition) -> Result<(), PositionError> {
        if position.string < 1 || position.string > self.string_count() {
            return Err(PositionError::StringOutOfRange {
                string: position.string,
                string_count: self.string_count(),
            });
        }
        if position.fret > self.max_fret {
            return Err(PositionError::FretOutOfRange {
                fret: position.fret,
                max_fret: self.max_fret,
            });
        }
        Ok(())
    }

    /// The note played at a position.
    pub fn position_to_note(&self, position: FretboardPosition) -> Result<Note, PositionError> {
        self.check_bounds(position)?;
        // Within bounds, every position has been filled in by the constructor.
        Ok(self.position_to_note[&position])
    }

    /// All positions where `note` can be played, ordered by string and then fret.
    /// Empty if the note is out of reach of this tuning.
    pub fn note_to_positions(&self, note: Note) -> &[FretboardPosition] {
        match self.note_to_positions.get(&note) {
            Some(positions) => positions.as_slice(),
            None => {
                debug!("{} is not available in this tuning", note);
                &[]
            }
        }
    }

    /// All positions where a pitch class can be played in any octave,
    /// ordered by string and then fret.
    ///
    /// ```
    /// # use fretsynth::fretboard::*;
    /// # use fretsynth::note::*;
    /// let table = TuningTable::new(vec![Note::new(PitchClass::E, 2)], 12);
    /// assert_eq!(
    ///     table.pitch_class_positions(PitchClass::E),
    ///     vec![FretboardPosition::new(1, 0), FretboardPosition::new(1, 12)]
    /// );
    /// ```
    pub fn pitch_class_positions(&self, pitch_class: PitchClass) -> Vec<FretboardPosition> {
        let mut positions: Vec<FretboardPosition> = self
            .note_to_positions
            .iter()
            .filter(|(note, _)| note.pitch_class == pitch_class)
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort();
        positions
    }

    /// The chromatic run along one string, from the open string up to the last fret.
    pub fn string_positions(
        &self,
        string: usize,
    ) -> Result<Vec<(FretboardPosition, Note)>, PositionError> {
        self.check_bounds(FretboardPosition::new(string, 0))?;
        Ok(self
            .position_to_note
            .range(FretboardPosition::new(string, 0)..=FretboardPosition::new(string, self.max_fret))
            .map(|(&position, &note)| (position, note))
            .collect())
    }
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Open strings of a guitar in standard tuning, from the lowest string up.
pub fn standard_tuning() -> Vec<Note> {
    vec![
        Note::new(PitchClass::E, 2),
        Note::new(PitchClass::A, 2),
        Note::new(PitchClass::D, 3),
        Note::new(PitchClass::G, 3),
        Note::new(PitchClass::B, 3),
        Note::new(PitchClass::E, 4),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::PitchClass::*;

    #[test]
    fn open_strings() {
        let table = TuningTable::standard();
        assert_eq!(table.string_count(), 6);
        assert_eq!(table.max_fret(), 21);
        assert_eq!(
            table.position_to_note(FretboardPosition::new(1, 0)),
            Ok(Note::new(E, 2))
        );
        assert_eq!(
            table.position_to_note(FretboardPosition::new(6, 0)),
            Ok(Note::new(E, 4))
        );
        for (string, &open) in table.open_strings().iter().enumerate() {
            assert_eq!(
                table.position_to_note(FretboardPosition::new(string + 1, 0)),
                Ok(open)
            );
        }
    }

    #[test]
    fn octave_carry() {
        let table = TuningTable::standard();
        // B3 string: fret 1 crosses into octave 4
        assert_eq!(
            table.position_to_note(FretboardPosition::new(5, 1)),
            Ok(Note::new(C, 4))
        );
        assert_eq!(
            table.position_to_note(FretboardPosition::new(1, 12)),
            Ok(Note::new(E, 3))
        );
        assert_eq!(
            table.position_to_note(FretboardPosition::new(6, 21)),
            Ok(Note::new(CSharp, 6))
        );
    }

    #[test]
    fn out_of_bounds() {
        let table = TuningTable::standard();
        assert_eq!(
            table.position_to_note(FretboardPosition::new(0, 3)),
            Err(PositionError::StringOutOfRange {
                string: 0,
                string_count: 6
            })
        );
        assert_eq!(
            table.position_to_note(FretboardPosition::new(7, 3)),
            Err(PositionError::StringOutOfRange {
                string: 7,
                string_count: 6
            })
        );
        assert_eq!(
            table.position_to_note(FretboardPosition::new(3, 22)),
            Err(PositionError::FretOutOfRange {
                fret: 22,
                max_fret: 21
            })
        );
        assert!(table.string_positions(9).is_err());
    }

    #[test]
    fn bidirectional_consistency() {
        let table = TuningTable::standard();
        let mut total = 0;
        for midi in 0..=127 {
            let note = Note::try_from_midi(midi).unwrap();
            for &position in table.note_to_positions(note) {
                assert_eq!(table.position_to_note(position), Ok(note));
                total += 1;
            }
        }
        assert_eq!(total, 6 * 22);
        for string in 1..=6 {
            for fret in 0..=21 {
                let position = FretboardPosition::new(string, fret);
                let note = table.position_to_note(position).unwrap();
                assert!(table.note_to_positions(note).contains(&position));
            }
        }
    }

    #[test]
    fn unreachable_notes() {
        let table = TuningTable::standard();
        assert!(table.note_to_positions(Note::new(E, 1)).is_empty());
        assert!(table.note_to_positions(Note::new(D, 6)).is_empty());
        assert_eq!(
            table.note_to_positions(Note::new(E, 4)),
            &[
                FretboardPosition::new(2, 19),
                FretboardPosition::new(3, 14),
                FretboardPosition::new(4, 9),
                FretboardPosition::new(5, 5),
                FretboardPosition::new(6, 0),
            ]
        );
    }

    #[test]
    fn chromatic_string_run() {
        let table = TuningTable::standard();
        let run = table.string_positions(2).unwrap();
        assert_eq!(run.len(), 22);
        assert_eq!(run[0], (FretboardPosition::new(2, 0), Note::new(A, 2)));
        assert_eq!(run[3], (FretboardPosition::new(2, 3), Note::new(C, 3)));
        assert!(run.windows(2).all(|w| w[1].1 == w[0].1.transpose(1)));
    }

    #[test]
    fn every_pitch_class_on_the_neck() {
        let table = TuningTable::standard();
        let mut count = 0;
        for &pitch_class in PitchClass::ALL.iter() {
            let positions = table.pitch_class_positions(pitch_class);
            for &position in &positions {
                let note = table.position_to_note(position).unwrap();
                assert_eq!(note.pitch_class, pitch_class);
            }
            count += positions.len();
        }
        assert_eq!(count, 6 * 22);
    }

    #[test]
    fn shared_between_threads() {
        let table = std::sync::Arc::new(TuningTable::standard());
        let handles: Vec<_> = (1..=6)
            .map(|string| {
                let table = table.clone();
                std::thread::spawn(move || {
                    table
                        .position_to_note(FretboardPosition::new(string, 0))
                        .unwrap()
                })
            })
            .collect();
        let opens: Vec<Note> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(opens, standard_tuning());
    }
}
