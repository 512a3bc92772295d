use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{check_tempo, Error, Result};
use crate::music::note::{Chord, Note};

/// Beat multiples a duration can snap to.
pub const SUPPORTED_MULTIPLIERS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];

/// How far (in beats) a duration may sit from a multiplier and still snap to it.
pub const MULTIPLIER_TOLERANCE: f64 = 0.1;

/// Token emitted for an empty layer.
pub const REST: &str = "~";

pub const DEFAULT_SOUND: &str = "piano";

/// Meter as `beats/unit`, e.g. 4/4 or 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub beats: u32,
    pub unit: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature { beats: 4, unit: 4 };

    /// Seconds per beat: (60 / tempo) * (4 / unit).
    pub fn beat_duration(self, tempo_bpm: f64) -> f64 {
        (60.0 / tempo_bpm) * (4.0 / self.unit as f64)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

impl FromStr for TimeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTimeSignature(s.to_string());
        let (beats, unit) = s.trim().split_once('/').ok_or_else(invalid)?;
        let beats: u32 = beats.trim().parse().map_err(|_| invalid())?;
        let unit: u32 = unit.trim().parse().map_err(|_| invalid())?;
        if beats == 0 || unit == 0 {
            return Err(invalid());
        }
        Ok(Self { beats, unit })
    }
}

/// The three text artifacts for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPattern {
    /// `note("...").sound("...")` for the melody.
    pub melody: String,
    /// Same shape, chord tokens in brackets.
    pub chords: String,
    /// Header comment plus both layers stacked, with the global speed.
    pub combined: String,
}

/// Snap a length in beats to the nearest supported multiplier.
///
/// `None` when no multiplier is within [`MULTIPLIER_TOLERANCE`]; the token
/// then renders without a suffix, i.e. as one beat.
pub fn quantize_multiplier(beats: f64) -> Option<f64> {
    SUPPORTED_MULTIPLIERS
        .iter()
        .copied()
        .map(|m| (m, (beats - m).abs()))
        .filter(|&(_, diff)| diff <= MULTIPLIER_TOLERANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}

/// `*m` for anything but one beat.
fn multiplier_suffix(duration: f64, beat: f64) -> String {
    match quantize_multiplier(duration / beat) {
        Some(m) if m != 1.0 => format!("*{m}"),
        _ => String::new(),
    }
}

/// Translate letter/accidental/octave spellings (`C#4`, `Bb3`, `e5`) into
/// the lowercase scheme (`cs4`, `bf3`, `e5`). Anything else is lower-cased
/// and passed through, so names already in the scheme (`fs3`) survive as-is.
pub fn format_pitch(name: &str) -> String {
    let mut chars = name.chars();
    let Some(letter) = chars.next().filter(|c| matches!(c.to_ascii_lowercase(), 'a'..='g')) else {
        return name.to_lowercase();
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') => ("s", &rest[1..]),
        Some('b') => ("f", &rest[1..]),
        _ => ("", rest),
    };

    if !octave.bytes().all(|b| b.is_ascii_digit()) {
        return name.to_lowercase();
    }

    format!("{}{accidental}{octave}", letter.to_ascii_lowercase())
}

/// Renders notes and chords into the pattern mini-notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationRenderer {
    /// Instrument passed to `.sound(...)`.
    pub sound: String,
}

impl Default for NotationRenderer {
    fn default() -> Self {
        Self {
            sound: DEFAULT_SOUND.to_string(),
        }
    }
}

impl NotationRenderer {
    pub fn new(sound: impl Into<String>) -> Self {
        Self { sound: sound.into() }
    }

    fn layer(&self, tokens: Vec<String>) -> String {
        let body = if tokens.is_empty() {
            REST.to_string()
        } else {
            tokens.join(" ")
        };
        format!("note(\"{body}\").sound(\"{}\")", self.sound)
    }

    pub fn melody_line(&self, notes: &[Note], beat: f64) -> String {
        let tokens = notes
            .iter()
            .map(|n| {
                format!(
                    "{}{}",
                    format_pitch(&n.pitch),
                    multiplier_suffix(n.duration_or_default(), beat)
                )
            })
            .collect();
        self.layer(tokens)
    }

    pub fn chord_line(&self, chords: &[Chord], beat: f64) -> String {
        let tokens = chords
            .iter()
            .map(|c| {
                let pitches: Vec<String> = c.notes.iter().map(|p| format_pitch(p)).collect();
                format!("[{}]{}", pitches.join(","), multiplier_suffix(c.duration, beat))
            })
            .collect();
        self.layer(tokens)
    }

    /// Render all three artifacts. Only the tempo can make this fail.
    pub fn render(
        &self,
        notes: &[Note],
        chords: &[Chord],
        tempo_bpm: f64,
        time_signature: TimeSignature,
    ) -> Result<RenderedPattern> {
        let tempo_bpm = check_tempo(tempo_bpm)?;
        let beat = time_signature.beat_duration(tempo_bpm);

        let melody = self.melody_line(notes, beat);
        let chord_layer = self.chord_line(chords, beat);
        let cpm = (tempo_bpm / 4.0).round() as i64;

        let combined = format!(
            "// Tempo: {tempo_bpm} BPM, Time Signature: {time_signature}\n\
             stack(\n  {melody},\n  {chord_layer}\n).cpm({cpm})\n"
        );

        Ok(RenderedPattern {
            melody,
            chords: chord_layer,
            combined,
        })
    }
}
