use crate::audio::AudioBuffer;
use crate::config::AppConfig;
use crate::dsp::pitch::{extract_pitch_contour, voiced_fraction, PitchConfig};
use crate::dsp::segment::notes_from_contour;
use crate::dsp::tempo::{estimate_tempo, DEFAULT_TEMPO_BPM};
use crate::error::{check_tempo, Result};
use crate::music::chord::generate_chords;
use crate::music::key::{Key, KeyDetector};
use crate::music::note::{total_span, Note};
use crate::notation::render::{NotationRenderer, TimeSignature};

use super::result::{AnalysisResult, Transcription};

/// What a caller hands the pipeline for one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    /// Decoded audio: pitch, key and tempo all come from the signal.
    Audio(AudioBuffer),
    /// A ready-made note list: pitch tracking is skipped.
    Notes(Vec<Note>),
}

/// Per-run overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOptions {
    /// Skip tempo estimation and use this BPM.
    pub tempo: Option<f64>,
    /// Skip key detection and use this key.
    pub key: Option<Key>,
    pub time_signature: TimeSignature,
    /// 0-100. Overrides the configured pitch-tracking sensitivity.
    pub sensitivity: Option<f64>,
}

/// Composes pitch tracking, key detection, harmonisation and rendering.
///
/// Holds only read-only settings, so one pipeline can serve many units at
/// once; `run` never touches anything outside its arguments.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    pub pitch: PitchConfig,
    /// Shortest note kept from the contour, in milliseconds.
    pub min_note_ms: f64,
    /// Tempo used when estimation has nothing to go on.
    pub default_tempo: f64,
    pub key_detector: KeyDetector<'static>,
    pub renderer: NotationRenderer,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self {
            pitch: PitchConfig::default(),
            min_note_ms: 100.0,
            default_tempo: DEFAULT_TEMPO_BPM,
            key_detector: KeyDetector::default(),
            renderer: NotationRenderer::default(),
        }
    }
}

impl AnalysisPipeline {
    /// Build from validated application config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let analysis = &config.analysis;

        Ok(Self {
            pitch: PitchConfig::try_from(analysis)?,
            min_note_ms: analysis.min_note_ms,
            default_tempo: check_tempo(config.render.default_tempo)?,
            key_detector: KeyDetector::default(),
            renderer: NotationRenderer::new(config.render.sound.clone()),
        })
    }

    /// Track pitch across the buffer and segment it into notes.
    pub fn transcribe_notes(&self, audio: &AudioBuffer, pitch: &PitchConfig) -> Result<Vec<Note>> {
        let contour = extract_pitch_contour(audio.samples(), audio.sample_rate(), pitch)?;
        let notes = notes_from_contour(&contour, pitch.hop_size_ms, self.min_note_ms);

        log::debug!(
            "{} frames ({:.0}% voiced) -> {} notes",
            contour.len(),
            voiced_fraction(&contour) * 100.0,
            notes.len()
        );
        Ok(notes)
    }

    /// Analyse one unit.
    ///
    /// Fails only when an explicit parameter is out of contract (bad tempo,
    /// sensitivity or sample rate, or a caller note with a non-finite or
    /// negative onset, a non-positive duration or a velocity outside 0-1). Silence, empty inputs and unusable
    /// pitch names produce a well-formed, possibly empty, result.
    pub fn run(&self, input: AnalysisInput, options: &AnalysisOptions) -> Result<Transcription> {
        let tempo_override = options.tempo.map(check_tempo).transpose()?;

        let (notes, duration) = match input {
            AnalysisInput::Audio(audio) => {
                let pitch = match options.sensitivity {
                    Some(s) => PitchConfig {
                        estimator: self.pitch.estimator.with_sensitivity(s)?,
                        ..self.pitch.clone()
                    },
                    None => self.pitch.clone(),
                };
                let notes = self.transcribe_notes(&audio, &pitch)?;
                (notes, audio.duration_secs())
            }
            AnalysisInput::Notes(notes) => {
                for note in &notes {
                    note.validate()?;
                }
                let span = total_span(&notes);
                (notes, span)
            }
        };

        let detected_key = match options.key {
            Some(key) => key,
            None => self.key_detector.detect(&notes),
        };
        let estimated_tempo = match tempo_override {
            Some(bpm) => bpm,
            None => estimate_tempo(&notes, self.default_tempo),
        };

        let chords = generate_chords(&notes, detected_key);
        let pattern = self
            .renderer
            .render(&notes, &chords, estimated_tempo, options.time_signature)?;

        log::debug!(
            "analysed {duration:.2}s: {} notes, {} chords, key {detected_key}, {estimated_tempo} BPM",
            notes.len(),
            chords.len()
        );

        Ok(Transcription {
            result: AnalysisResult {
                notes,
                chords,
                detected_key,
                estimated_tempo,
                duration,
            },
            pattern,
        })
    }
}
