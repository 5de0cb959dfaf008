// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Deriving scales, pentatonics and triads from a root and a pattern of intervals.

use std::fmt;

use snafu::Snafu;

use crate::note::{Note, PitchClass, SEMITONES_PER_OCTAVE};

pub const SEMITONE: i32 = 1;
pub const TONE: i32 = 2;
pub const MINOR_THIRD: i32 = 3;
pub const MAJOR_THIRD: i32 = 4;

/// Degrees of the natural minor scale forming the minor pentatonic scale.
pub const MINOR_PENTATONIC_DEGREES: [usize; 5] = [1, 3, 4, 5, 7];
/// Degrees of the major scale forming the major pentatonic scale.
pub const MAJOR_PENTATONIC_DEGREES: [usize; 5] = [1, 2, 3, 5, 6];

/// Semitone steps between consecutive notes of a scale, spanning exactly one octave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalSequence {
    steps: Vec<i32>,
}

impl IntervalSequence {
    /// Validate a custom sequence of steps.
    ///
    /// ```
    /// use fretsynth::scale::*;
    ///
    /// let whole_tone = IntervalSequence::try_new(vec![2; 6]).unwrap();
    /// assert_eq!(whole_tone.steps().len(), 6);
    /// assert!(IntervalSequence::try_new(vec![2, 2, 2]).is_err());
    /// ```
    pub fn try_new(steps: Vec<i32>) -> Result<IntervalSequence, IntervalError> {
        if let Some(&step) = steps.iter().find(|&&step| step <= 0) {
            return Err(IntervalError::NonPositiveStep { step });
        }
        let total: i32 = steps.iter().sum();
        if total != SEMITONES_PER_OCTAVE {
            return Err(IntervalError::NotAnOctave { total });
        }
        Ok(IntervalSequence { steps })
    }

    pub fn major() -> IntervalSequence {
        IntervalSequence {
            steps: vec![TONE, TONE, SEMITONE, TONE, TONE, TONE, SEMITONE],
        }
    }

    pub fn natural_minor() -> IntervalSequence {
        IntervalSequence {
            steps: vec![TONE, SEMITONE, TONE, TONE, SEMITONE, TONE, TONE],
        }
    }

    pub fn steps(&self) -> &[i32] {
        &self.steps
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum IntervalError {
    #[snafu(display("Interval steps must be positive, got {}", step))]
    NonPositiveStep { step: i32 },
    #[snafu(display("Interval steps must add up to one octave, got {} semitones", total))]
    NotAnOctave { total: i32 },
}

/// Start at `root` and take each step in turn, collecting every pitch class visited.
fn step_through(root: PitchClass, steps: &[i32]) -> Vec<PitchClass> {
    let mut current = root;
    let mut visited = Vec::with_capacity(steps.len() + 1);
    visited.push(current);
    for &step in steps {
        current = current.transpose(step);
        visited.push(current);
    }
    visited
}

/// An ascending scale, ending with the root again one octave up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scale {
    pitch_classes: Vec<PitchClass>,
}

impl Scale {
    /// All pitch classes of the scale including the closing octave.
    pub fn pitch_classes(&self) -> &[PitchClass] {
        &self.pitch_classes
    }

    pub fn root(&self) -> PitchClass {
        self.pitch_classes[0]
    }

    /// The distinct scale degrees, i.e. without the closing octave.
    pub fn degrees(&self) -> &[PitchClass] {
        &self.pitch_classes[..self.pitch_classes.len() - 1]
    }

    /// Pitch class of a 1-indexed scale degree.
    ///
    /// # Panics
    ///
    /// If `degree` is zero or larger than the number of distinct degrees.
    pub fn degree(&self, degree: usize) -> PitchClass {
        let degrees = self.degrees();
        assert!(
            degree >= 1 && degree <= degrees.len(),
            "scale degree {} outside of 1..={}",
            degree,
            degrees.len()
        );
        degrees[degree - 1]
    }

    /// Place the scale in ascending order starting in `octave`.
    ///
    /// ```
    /// use fretsynth::note::*;
    /// use fretsynth::scale::*;
    ///
    /// let notes = major_scale(PitchClass::G).notes_from_octave(3);
    /// assert_eq!(notes.first(), Some(&Note::new(PitchClass::G, 3)));
    /// assert_eq!(notes[3], Note::new(PitchClass::C, 4));
    /// assert_eq!(notes.last(), Some(&Note::new(PitchClass::G, 4)));
    /// ```
    pub fn notes_from_octave(&self, octave: i32) -> Vec<Note> {
        ascending_notes(&self.pitch_classes, octave)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_pitch_classes(f, &self.pitch_classes)
    }
}

fn write_pitch_classes(f: &mut fmt::Formatter, pitch_classes: &[PitchClass]) -> fmt::Result {
    for (i, pitch_class) in pitch_classes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", pitch_class)?;
    }
    Ok(())
}

/// Assign octaves to a sequence of pitch classes so that every note is higher
/// than the previous one, starting in `octave`.
pub fn ascending_notes(pitch_classes: &[PitchClass], mut octave: i32) -> Vec<Note> {
    let mut notes: Vec<Note> = Vec::with_capacity(pitch_classes.len());
    for &pitch_class in pitch_classes {
        if let Some(previous) = notes.last() {
            if pitch_class <= previous.pitch_class {
                octave += 1;
            }
        }
        notes.push(Note::new(pitch_class, octave));
    }
    notes
}

/// # Examples
///
/// ```
/// use fretsynth::note::PitchClass::*;
/// use fretsynth::scale::*;
///
/// let c_major = scale_from_root(C, &IntervalSequence::major());
/// assert_eq!(c_major.pitch_classes(), &[C, D, E, F, G, A, B, C]);
/// ```
pub fn scale_from_root(root: PitchClass, intervals: &IntervalSequence) -> Scale {
    Scale {
        pitch_classes: step_through(root, intervals.steps()),
    }
}

pub fn major_scale(root: PitchClass) -> Scale {
    scale_from_root(root, &IntervalSequence::major())
}

pub fn natural_minor_scale(root: PitchClass) -> Scale {
    scale_from_root(root, &IntervalSequence::natural_minor())
}

/// Select 1-indexed degrees of a parent scale.
///
/// # Panics
///
/// If a degree lies outside of the parent scale.
pub fn pentatonic_from_scale(scale: &Scale, degrees: &[usize]) -> Vec<PitchClass> {
    degrees.iter().map(|&degree| scale.degree(degree)).collect()
}

pub fn minor_pentatonic_scale(root: PitchClass) -> Vec<PitchClass> {
    pentatonic_from_scale(&natural_minor_scale(root), &MINOR_PENTATONIC_DEGREES)
}

pub fn major_pentatonic_scale(root: PitchClass) -> Vec<PitchClass> {
    pentatonic_from_scale(&major_scale(root), &MAJOR_PENTATONIC_DEGREES)
}

/// Three pitch classes stacked in thirds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Triad {
    pub root: PitchClass,
    pub third: PitchClass,
    pub fifth: PitchClass,
}

impl Triad {
    pub fn pitch_classes(&self) -> [PitchClass; 3] {
        [self.root, self.third, self.fifth]
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_pitch_classes(f, &self.pitch_classes())
    }
}

/// A major third followed by a minor third.
///
/// ```
/// use fretsynth::note::PitchClass::*;
/// use fretsynth::scale::*;
///
/// assert_eq!(major_triad(C).pitch_classes(), [C, E, G]);
/// assert_eq!(major_triad(A).pitch_classes(), [A, CSharp, E]);
/// ```
pub fn major_triad(root: PitchClass) -> Triad {
    let stacked = step_through(root, &[MAJOR_THIRD, MINOR_THIRD]);
    Triad {
        root: stacked[0],
        third: stacked[1],
        fifth: stacked[2],
    }
}

/// Stack two scale-relative thirds on top of the 0-indexed `position` in a
/// seven note scale, wrapping around at the octave.
fn diatonic_triad(degrees: &[PitchClass], position: usize) -> Triad {
    let n = degrees.len();
    Triad {
        root: degrees[position % n],
        third: degrees[(position + 2) % n],
        fifth: degrees[(position + 4) % n],
    }
}

/// The triads built on each of the seven degrees of a major key.
/// Their quality (major, minor, diminished) follows from the scale and is not classified.
pub fn triads_in_major_key(root: PitchClass) -> Vec<Triad> {
    let scale = major_scale(root);
    let degrees = scale.degrees();
    (0..degrees.len())
        .map(|position| diatonic_triad(degrees, position))
        .collect()
}

/// The triad on a single 1-indexed degree of a major key.
///
/// # Panics
///
/// If `degree` is outside of `1..=7`.
pub fn triad_in_major_key(root: PitchClass, degree: usize) -> Triad {
    let scale = major_scale(root);
    let root_of_triad = scale.degree(degree);
    Triad {
        root: root_of_triad,
        ..diatonic_triad(scale.degrees(), degree - 1)
    }
}

/// Append the reversed sequence without repeating the turnaround element,
/// e.g. turning an ascending scale into an ascending and descending one.
/// When `looping`, the final return to the first element is left out as well,
/// since playing the sequence again starts there.
///
/// # Examples
///
/// ```
/// use fretsynth::scale::append_reversed_sequence;
///
/// assert_eq!(append_reversed_sequence(&['a', 'b', 'c'], true), vec!['a', 'b', 'c', 'b']);
/// assert_eq!(append_reversed_sequence(&['a', 'b', 'c'], false), vec!['a', 'b', 'c', 'b', 'a']);
/// ```
pub fn append_reversed_sequence<T: Clone>(sequence: &[T], looping: bool) -> Vec<T> {
    let n = sequence.len();
    let mut out = sequence.to_vec();
    if n < 2 {
        return out;
    }
    let stop = if looping { 1 } else { 0 };
    out.extend(sequence[stop..n - 1].iter().rev().cloned());
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::PitchClass::*;

    #[test]
    fn major_and_minor_scales() {
        assert_eq!(major_scale(C).pitch_classes(), &[C, D, E, F, G, A, B, C]);
        assert_eq!(
            major_scale(D).pitch_classes(),
            &[D, E, FSharp, G, A, B, CSharp, D]
        );
        assert_eq!(
            natural_minor_scale(A).pitch_classes(),
            &[A, B, C, D, E, F, G, A]
        );
        assert_eq!(major_scale(E).to_string(), "E, F#, G#, A, B, C#, D#, E");
        for &root in PitchClass::ALL.iter() {
            let scale = major_scale(root);
            assert_eq!(scale.pitch_classes().len(), 8);
            assert_eq!(scale.root(), root);
            assert_eq!(scale.pitch_classes()[7], root);
        }
    }

    #[test]
    fn pentatonics() {
        assert_eq!(minor_pentatonic_scale(A), vec![A, C, D, E, G]);
        assert_eq!(minor_pentatonic_scale(E), vec![E, G, A, B, D]);
        assert_eq!(major_pentatonic_scale(C), vec![C, D, E, G, A]);
    }

    #[test]
    #[should_panic]
    fn pentatonic_degree_out_of_range() {
        pentatonic_from_scale(&major_scale(C), &[1, 8]);
    }

    #[test]
    #[should_panic]
    fn degree_zero() {
        triad_in_major_key(C, 0);
    }

    #[test]
    #[should_panic]
    fn degree_past_the_octave() {
        triad_in_major_key(C, 8);
    }

    #[test]
    fn single_degree_triads() {
        let scale = major_scale(F);
        for (i, triad) in triads_in_major_key(F).into_iter().enumerate() {
            let single = triad_in_major_key(F, i + 1);
            assert_eq!(single.root, scale.degree(i + 1));
            assert_eq!(single, triad);
        }
    }

    #[test]
    fn triads_in_d_major() {
        let triads: Vec<_> = triads_in_major_key(D)
            .iter()
            .map(|t| t.pitch_classes())
            .collect();
        assert_eq!(
            triads,
            vec![
                [D, FSharp, A],
                [E, G, B],
                [FSharp, A, CSharp],
                [G, B, D],
                [A, CSharp, E],
                [B, D, FSharp],
                [CSharp, E, G],
            ]
        );
        assert_eq!(triad_in_major_key(D, 5), major_triad(A));
        assert_eq!(triad_in_major_key(D, 1).to_string(), "D, F#, A");
    }

    #[test]
    fn custom_intervals() {
        assert_eq!(
            IntervalSequence::try_new(vec![3, 0, 9]),
            Err(IntervalError::NonPositiveStep { step: 0 })
        );
        assert_eq!(
            IntervalSequence::try_new(vec![2, 2, 1, 2, 2, 2, 2]),
            Err(IntervalError::NotAnOctave { total: 13 })
        );
        let blues = IntervalSequence::try_new(vec![3, 2, 1, 1, 3, 2]).unwrap();
        assert_eq!(
            scale_from_root(A, &blues).pitch_classes(),
            &[A, C, D, DSharp, E, G, A]
        );
    }

    #[test]
    fn ascending_octaves() {
        let notes = ascending_notes(&minor_pentatonic_scale(A), 4);
        let octaves: Vec<_> = notes.iter().map(|n| n.octave).collect();
        assert_eq!(octaves, vec![4, 5, 5, 5, 5]);
        let c_major = major_scale(C).notes_from_octave(4);
        assert_eq!(c_major[0], Note::new(C, 4));
        assert_eq!(c_major[6], Note::new(B, 4));
        assert_eq!(c_major[7], Note::new(C, 5));
        assert!(c_major.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reversed_sequences() {
        let empty: [i32; 0] = [];
        assert!(append_reversed_sequence(&empty, true).is_empty());
        assert_eq!(append_reversed_sequence(&[1], false), vec![1]);
        assert_eq!(append_reversed_sequence(&[1, 2], true), vec![1, 2]);
        assert_eq!(append_reversed_sequence(&[1, 2], false), vec![1, 2, 1]);
        let scale = minor_pentatonic_scale(A);
        let up_and_down = append_reversed_sequence(&scale, true);
        assert_eq!(up_and_down, vec![A, C, D, E, G, E, D, C]);
    }
}
