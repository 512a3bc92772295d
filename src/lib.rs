//! Turn audio into a two-layer Strudel pattern.
//!
//! The pipeline tracks pitch frame by frame, snaps it to note names, picks a
//! key from a weighted pitch-class histogram, lays a diatonic progression
//! under the melody and renders both as mini-notation:
//!
//! ```text
//! AudioBuffer → pitch contour → notes → key / tempo → chords → pattern text
//! ```
//!
//! Decoding and file handling stay outside the core: hand
//! [`AnalysisPipeline::run`] an [`AudioBuffer`] (or a ready-made note list)
//! and it returns an [`AnalysisResult`] plus the rendered text.
//!
//! ```
//! use strudelscribe::{AnalysisInput, AnalysisOptions, AnalysisPipeline, Note};
//!
//! let notes = vec![
//!     Note::new("c4", 0.0).with_duration(0.5),
//!     Note::new("e4", 0.5).with_duration(0.5),
//!     Note::new("g4", 1.0).with_duration(1.0),
//!     Note::new("c5", 2.0).with_duration(0.5),
//! ];
//! let out = AnalysisPipeline::default()
//!     .run(AnalysisInput::Notes(notes), &AnalysisOptions::default())?;
//! assert_eq!(out.result.detected_key.to_string(), "C");
//! println!("{}", out.pattern.combined);
//! # Ok::<(), strudelscribe::Error>(())
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod music;
pub mod notation;
pub mod paths;

pub use analysis::{AnalysisInput, AnalysisOptions, AnalysisPipeline, AnalysisResult, Transcription};
pub use audio::AudioBuffer;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use music::{Chord, Key, Note};
pub use notation::{NotationRenderer, RenderedPattern, TimeSignature};
