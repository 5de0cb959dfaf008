// fretsynth -- fretboard mapping and plucked string synthesis
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `fretsynth` - shows scales and triads on the fretboard and plucks them.

use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use structopt::StructOpt;

use fretsynth::config::RenderConfig;
use fretsynth::fretboard::TuningTable;
use fretsynth::note::{Note, PitchClass};
use fretsynth::play::OnsetMixer;
use fretsynth::scale;

#[derive(Debug, StructOpt)]
#[structopt(name = "fretsynth", about = "Scales on the fretboard, plucked")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Print the notes of a scale and where to play them.
    Scale {
        #[structopt(flatten)]
        scale: ScaleOpt,
    },
    /// Print the triads on each degree of a major key.
    Triads {
        /// Root of the key, e.g. `D` or `Bb`.
        root: PitchClass,
    },
    /// Pluck a scale up and down, writing mono little-endian f64 samples without header,
    /// e.g. for `play -t f64 -r 44100 -c 1 <file>`.
    Render {
        #[structopt(flatten)]
        scale: ScaleOpt,

        /// Beats per minute, one note per beat.
        #[structopt(short, long, default_value = "60")]
        bpm: f64,

        /// Karplus-Strong smoothing factor in [0, 1].
        #[structopt(long, default_value = "0.5")]
        smoothing: f64,

        /// Seed for the initial noise, random if not given.
        #[structopt(long)]
        seed: Option<u64>,

        /// Output file for the raw samples.
        #[structopt(short, long, parse(from_os_str))]
        output: PathBuf,
    },
}

#[derive(Debug, StructOpt)]
struct ScaleOpt {
    /// Root of the scale, e.g. `A` or `F#`.
    root: PitchClass,

    /// One of major, minor, major-pentatonic, minor-pentatonic.
    #[structopt(short, long, default_value = "major")]
    kind: ScaleKind,

    /// Octave of the root note, within -1..=9.
    #[structopt(long, default_value = "3", parse(try_from_str = parse_octave))]
    octave: i32,
}

/// Octaves covered by MIDI note numbers.
const OCTAVES: RangeInclusive<i32> = -1..=9;

fn parse_octave(s: &str) -> Result<i32, String> {
    let octave: i32 = s.parse().map_err(|e| format!("{}: {}", s, e))?;
    if !OCTAVES.contains(&octave) {
        return Err(format!(
            "octave {} outside of {}..={}",
            octave,
            OCTAVES.start(),
            OCTAVES.end()
        ));
    }
    Ok(octave)
}

#[derive(Debug, Clone, Copy)]
enum ScaleKind {
    Major,
    Minor,
    MajorPentatonic,
    MinorPentatonic,
}

impl FromStr for ScaleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(ScaleKind::Major),
            "minor" => Ok(ScaleKind::Minor),
            "major-pentatonic" => Ok(ScaleKind::MajorPentatonic),
            "minor-pentatonic" => Ok(ScaleKind::MinorPentatonic),
            _ => Err(format!("unknown scale {:?}", s)),
        }
    }
}

impl ScaleOpt {
    /// The ascending notes of the scale, closed with the root an octave up.
    fn notes(&self) -> Vec<Note> {
        let mut pitch_classes = match self.kind {
            ScaleKind::Major => scale::major_scale(self.root).pitch_classes().to_vec(),
            ScaleKind::Minor => scale::natural_minor_scale(self.root)
                .pitch_classes()
                .to_vec(),
            ScaleKind::MajorPentatonic => scale::major_pentatonic_scale(self.root),
            ScaleKind::MinorPentatonic => scale::minor_pentatonic_scale(self.root),
        };
        if pitch_classes.last() != Some(&self.root) {
            pitch_classes.push(self.root);
        }
        scale::ascending_notes(&pitch_classes, self.octave)
    }
}

fn invalid_input<E: ToString>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
}

fn print_positions(table: &TuningTable, notes: &[Note]) {
    for &note in notes {
        let positions = table.note_to_positions(note);
        if positions.is_empty() {
            println!("{:>4}: not on the fretboard", note.to_string());
        } else {
            let positions: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
            println!("{:>4}: {}", note.to_string(), positions.join(" "));
        }
    }
}

fn render(
    config: &RenderConfig,
    notes: &[Note],
    bpm: f64,
    seed: Option<u64>,
    output: &Path,
) -> io::Result<()> {
    let mixer = OnsetMixer::from_config(config).map_err(invalid_input)?;
    let frequencies: Vec<f64> = scale::append_reversed_sequence(notes, true)
        .into_iter()
        .map(Note::frequency)
        .collect();

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_entropy(),
    };
    let buffer = mixer
        .pluck_at_tempo(&frequencies, bpm, config.padding_ms, &mut rng)
        .map_err(invalid_input)?;

    let mut bytes = vec![0u8; buffer.byte_len()];
    buffer.copy_bytes_to(&mut bytes);
    std::fs::write(output, &bytes)?;
    info!(
        "wrote {} samples ({:.2} seconds at {} Hz) to {}",
        buffer.len(),
        buffer.duration(),
        buffer.sample_rate(),
        output.display()
    );
    Ok(())
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut config = RenderConfig::default();
    match opt.command {
        Command::Scale { scale: selected } => {
            let notes = selected.notes();
            info!("{:?} scale on {}", selected.kind, selected.root);
            print_positions(&config.tuning_table(), &notes);
        }
        Command::Triads { root } => {
            for (degree, triad) in scale::triads_in_major_key(root).iter().enumerate() {
                println!("{}: {}", degree + 1, triad);
            }
        }
        Command::Render {
            scale: selected,
            bpm,
            smoothing,
            seed,
            output,
        } => {
            config.smoothing_factor = smoothing;
            let notes = selected.notes();
            info!(
                "plucking {:?} scale on {} at {} bpm",
                selected.kind, selected.root, bpm
            );
            render(&config, &notes, bpm, seed, &output)?;
        }
    }
    Ok(())
}
