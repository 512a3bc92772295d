//! Signal side: frame-wise pitch tracking, note segmentation and tempo.

pub mod pitch;
pub mod segment;
pub mod tempo;

pub use pitch::{extract_pitch_contour, PitchConfig, PitchEstimator, PitchFrame};
pub use segment::notes_from_contour;
pub use tempo::{estimate_tempo, DEFAULT_TEMPO_BPM};
