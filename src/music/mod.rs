//! Symbolic side of the pipeline: pitch names, keys and chords.

pub mod chord;
pub mod key;
pub mod note;
pub mod pitch;

pub use chord::{generate_chords, progression_for, ChordSymbol};
pub use key::{detect_key, Key, KeyDetector, Mode, TonalProfiles, KRUMHANSL_KESSLER};
pub use note::{Chord, Note};
pub use pitch::{quantize_frequency, to_note_name, PitchClass, PitchName};
