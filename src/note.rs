// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is, and conversions between notes, MIDI numbers,
//! piano keys and frequencies.

use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

/// Number of semitones per octave.
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// Lowest and highest MIDI note number.
pub const MIDI_MIN: i32 = 0;
pub const MIDI_MAX: i32 = 127;

/// Range of MIDI note numbers covered by an 88-key piano.
pub const PIANO_MIDI_MIN: i32 = 21;
pub const PIANO_MIDI_MAX: i32 = 108;

/// Piano keys are numbered from 1 (A0) to 88 (C8).
pub const PIANO_KEY_MIN: i32 = 1;
pub const PIANO_KEY_MAX: i32 = 88;

/// One of the twelve equal-tempered pitch classes, independent of the octave.
///
/// Enharmonic spellings are not distinguished, a D♭ is represented as `CSharp`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in ascending order, starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    const NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    /// Position of the pitch class in the chromatic scale starting at C.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Pitch class at the given chromatic index, wrapping around in both directions.
    ///
    /// # Examples
    ///
    /// ```
    /// use fretsynth::note::PitchClass;
    ///
    /// assert_eq!(PitchClass::from_index(9), PitchClass::A);
    /// assert_eq!(PitchClass::from_index(13), PitchClass::CSharp);
    /// assert_eq!(PitchClass::from_index(-1), PitchClass::B);
    /// ```
    pub fn from_index(index: i32) -> PitchClass {
        Self::ALL[index.rem_euclid(SEMITONES_PER_OCTAVE) as usize]
    }

    /// Move the pitch class up (or down, if negative) by some semitones.
    pub fn transpose(self, semitones: i32) -> PitchClass {
        Self::from_index(self.index() + semitones)
    }

    /// Number of semitones to go upwards from `self` to `other`, in `0..12`.
    ///
    /// ```
    /// # use fretsynth::note::PitchClass;
    /// assert_eq!(PitchClass::A.semitones_to(PitchClass::C), 3);
    /// assert_eq!(PitchClass::C.semitones_to(PitchClass::A), 9);
    /// ```
    pub fn semitones_to(self, other: PitchClass) -> i32 {
        (other.index() - self.index()).rem_euclid(SEMITONES_PER_OCTAVE)
    }

    /// Canonical name, always spelled with sharps.
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Parse a letter with an optional accidental, returning the index relative to C.
    /// The result is not normalized, i.e. `Cb` yields -1 and `B#` yields 12.
    fn parse_index(input: &str) -> Result<i32, ParseNoteError> {
        let unknown = || ParseNoteError::UnknownPitchClass {
            name: input.to_string(),
        };
        let mut chars = input.chars();
        let letter = chars.next().ok_or_else(unknown)?;
        let letter_index = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(unknown()),
        };
        let offset = match chars.as_str() {
            "" => 0,
            "sharp" | "♯" | "#" => 1,
            "flat" | "♭" | "b" => -1,
            _ => return Err(unknown()),
        };
        Ok(letter_index + offset)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a pitch class such as `C`, `f#`, `Db` or `Asharp`.
///
/// ```
/// # use fretsynth::note::PitchClass;
/// assert_eq!("C#".parse(), Ok(PitchClass::CSharp));
/// assert_eq!("Db".parse(), Ok(PitchClass::CSharp));
/// assert_eq!("cb".parse(), Ok(PitchClass::B));
/// assert!("H".parse::<PitchClass>().is_err());
/// ```
impl FromStr for PitchClass {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchClass::parse_index(s).map(PitchClass::from_index)
    }
}

/// A pitch class in a specific octave, using scientific pitch notation where
/// C4 is middle C and A4 is concert pitch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: i32) -> Note {
        Note {
            pitch_class,
            octave,
        }
    }

    /// The note `semitones` above MIDI note 0 (C-1). Not restricted to the MIDI range.
    fn from_semitones(semitones: i32) -> Note {
        Note {
            pitch_class: PitchClass::from_index(semitones),
            octave: semitones.div_euclid(SEMITONES_PER_OCTAVE) - 1,
        }
    }

    /// The MIDI number of this note. The result lies outside of `0..=127` for
    /// notes that MIDI cannot represent.
    pub fn midi(self) -> i32 {
        (self.octave + 1) * SEMITONES_PER_OCTAVE + self.pitch_class.index()
    }

    /// Convert a MIDI note number back to a note.
    ///
    /// # Examples
    ///
    /// ```
    /// use fretsynth::note::*;
    ///
    /// assert_eq!(Note::try_from_midi(69), Ok(Note::new(PitchClass::A, 4)));
    /// assert_eq!(Note::try_from_midi(0), Ok(Note::new(PitchClass::C, -1)));
    /// assert!(Note::try_from_midi(128).is_err());
    /// ```
    pub fn try_from_midi(midi: i32) -> Result<Note, PitchError> {
        if midi < MIDI_MIN || midi > MIDI_MAX {
            return Err(PitchError::MidiOutOfRange { midi });
        }
        Ok(Note::from_semitones(midi))
    }

    /// Move the note by some semitones, carrying into the octave.
    ///
    /// ```
    /// # use fretsynth::note::*;
    /// let b3 = Note::new(PitchClass::B, 3);
    /// assert_eq!(b3.transpose(1), Note::new(PitchClass::C, 4));
    /// assert_eq!(b3.transpose(-12), Note::new(PitchClass::B, 2));
    /// ```
    pub fn transpose(self, semitones: i32) -> Note {
        Note::from_semitones(self.midi() + semitones)
    }

    /// Frequency of the note at the default concert pitch.
    pub fn frequency(self) -> f64 {
        ConcertPitch::default().frequency(self)
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.midi().cmp(&other.midi())
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Parse a name string of the format `<letter><accidental><octave>`.
/// Accidentals may move the note across an octave boundary, e.g. `Cb4` is `B3`.
///
/// # Examples
///
/// ```
/// # use fretsynth::note::*;
///
/// assert_eq!("A4".parse(), Ok(Note::new(PitchClass::A, 4)));
/// assert_eq!("a4".parse(), Ok(Note::new(PitchClass::A, 4)));
/// assert_eq!("Csharp6".parse(), Ok(Note::new(PitchClass::CSharp, 6)));
/// assert_eq!("Gb2".parse(), Ok(Note::new(PitchClass::FSharp, 2)));
/// assert_eq!("Cb4".parse(), Ok(Note::new(PitchClass::B, 3)));
/// assert_eq!("C-1".parse(), Ok(Note::new(PitchClass::C, -1)));
/// ```
impl FromStr for Note {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octave_start = s
            .char_indices()
            .skip(1)
            .find(|(_, ch)| ch.is_ascii_digit() || *ch == '-')
            .map(|(pos, _)| pos)
            .ok_or_else(|| ParseNoteError::MissingOctave {
                input: s.to_string(),
            })?;
        let (name_str, octave_str) = s.split_at(octave_start);
        let index = PitchClass::parse_index(name_str)?;
        let invalid_octave = || ParseNoteError::InvalidOctave {
            input: s.to_string(),
        };
        let octave: i32 = octave_str.parse().map_err(|_| invalid_octave())?;
        let semitones = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(SEMITONES_PER_OCTAVE))
            .and_then(|o| o.checked_add(index))
            .ok_or_else(invalid_octave)?;
        Ok(Note::from_semitones(semitones))
    }
}

/// Defines the pitch of all notes by assigning a frequency to a reference note,
/// assuming 12 equally tempered semitones per octave.
///
/// # Examples
///
/// ```
/// use fretsynth::note::*;
/// assert_eq!(ConcertPitch::default().frequency(Note::new(PitchClass::A, 3)), 220.0);
/// assert_eq!(ConcertPitch::default().frequency(Note::new(PitchClass::A, 5)), 880.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConcertPitch {
    pub reference_note: Note,
    pub reference_frequency: f64,
}

impl ConcertPitch {
    /// Return the frequency of a note relative to this reference.
    pub fn frequency(&self, note: Note) -> f64 {
        self.frequency_of_midi(note.midi())
    }

    /// Return the frequency of a MIDI note number relative to this reference.
    pub fn frequency_of_midi(&self, midi: i32) -> f64 {
        let semitones = midi - self.reference_note.midi();
        let octaves = semitones as f64 / SEMITONES_PER_OCTAVE as f64;
        self.reference_frequency * 2.0f64.powf(octaves)
    }
}

/// Default concert pitch, where A4 corresponds to 440 Hz.
impl Default for ConcertPitch {
    fn default() -> Self {
        ConcertPitch {
            reference_note: Note::new(PitchClass::A, 4),
            reference_frequency: 440.0,
        }
    }
}

/// Values outside of the domain of a pitch conversion.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum PitchError {
    #[snafu(display("MIDI note number {} is outside of {}..={}", midi, MIDI_MIN, MIDI_MAX))]
    MidiOutOfRange { midi: i32 },
    #[snafu(display(
        "MIDI note number {} has no piano key, must be within {}..={}",
        midi,
        PIANO_MIDI_MIN,
        PIANO_MIDI_MAX
    ))]
    NotOnPiano { midi: i32 },
    #[snafu(display(
        "Piano key {} is outside of {}..={}",
        key,
        PIANO_KEY_MIN,
        PIANO_KEY_MAX
    ))]
    PianoKeyOutOfRange { key: i32 },
}

/// Reasons why a string is not a valid note name.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseNoteError {
    #[snafu(display("{:?} is not a pitch class", name))]
    UnknownPitchClass { name: String },
    #[snafu(display("{:?} has no octave", input))]
    MissingOctave { input: String },
    #[snafu(display("{:?} has an invalid octave", input))]
    InvalidOctave { input: String },
}

/// `midi = (octave + 1) * 12 + index(pitch class)`
pub fn note_to_midi(note: Note) -> i32 {
    note.midi()
}

pub fn midi_to_note(midi: i32) -> Result<Note, PitchError> {
    Note::try_from_midi(midi)
}

/// Convert a MIDI note number to the number of the key on an 88-key piano.
///
/// ```
/// # use fretsynth::note::*;
/// assert_eq!(midi_to_piano_key(21), Ok(1));
/// assert_eq!(midi_to_piano_key(108), Ok(88));
/// assert!(midi_to_piano_key(20).is_err());
/// ```
pub fn midi_to_piano_key(midi: i32) -> Result<i32, PitchError> {
    if midi < PIANO_MIDI_MIN || midi > PIANO_MIDI_MAX {
        return Err(PitchError::NotOnPiano { midi });
    }
    Ok(midi - (PIANO_MIDI_MIN - PIANO_KEY_MIN))
}

pub fn piano_key_to_midi(key: i32) -> Result<i32, PitchError> {
    if key < PIANO_KEY_MIN || key > PIANO_KEY_MAX {
        return Err(PitchError::PianoKeyOutOfRange { key });
    }
    Ok(key + (PIANO_MIDI_MIN - PIANO_KEY_MIN))
}

/// Frequency in Hz of a MIDI note number, with A4 (69) at 440 Hz.
pub fn midi_to_frequency(midi: i32) -> f64 {
    ConcertPitch::default().frequency_of_midi(midi)
}

pub fn note_to_frequency(note: Note) -> f64 {
    midi_to_frequency(note_to_midi(note))
}
