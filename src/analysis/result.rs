use serde::Serialize;

use crate::music::key::Key;
use crate::music::note::{Chord, Note};
use crate::notation::render::RenderedPattern;

/// Everything extracted from one unit of audio (or one note list).
///
/// Built once at the end of [`AnalysisPipeline::run`](super::AnalysisPipeline::run)
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub notes: Vec<Note>,
    pub chords: Vec<Chord>,
    pub detected_key: Key,
    /// Beats per minute, always positive.
    pub estimated_tempo: f64,
    /// Seconds of audio analysed, or the note span in note-list mode.
    pub duration: f64,
}

/// The result together with its rendered text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub result: AnalysisResult,
    pub pattern: RenderedPattern,
}
