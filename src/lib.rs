pub mod fretboard;
pub mod note;
pub mod play;
pub mod scale;
pub mod synth;
pub mod wave;

// Utility modules
pub mod config;
