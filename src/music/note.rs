use serde::{Deserialize, Serialize};

use super::pitch::PitchName;
use crate::error::{Error, Result};

/// Duration assumed for a note that doesn't carry one (seconds).
pub const DEFAULT_NOTE_DURATION: f64 = 0.25;

/// Velocity assumed for a note that doesn't carry one.
pub const DEFAULT_VELOCITY: f64 = 0.8;

/// A timed melodic event.
///
/// `pitch` stays a plain string because callers may hand us pre-built note
/// lists: names outside the mini-notation grammar are skipped where they
/// matter (key detection) and passed through where they don't (rendering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Pitch name such as `c4` or `fs3`.
    pub pitch: String,
    /// Onset in seconds from the start of the unit.
    pub time: f64,
    /// Length in seconds. `None` means [`DEFAULT_NOTE_DURATION`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Loudness in 0.0-1.0. `None` means [`DEFAULT_VELOCITY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

impl Note {
    pub fn new(pitch: impl Into<String>, time: f64) -> Self {
        Self {
            pitch: pitch.into(),
            time,
            duration: None,
            velocity: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn duration_or_default(&self) -> f64 {
        self.duration.unwrap_or(DEFAULT_NOTE_DURATION)
    }

    pub fn velocity_or_default(&self) -> f64 {
        self.velocity.unwrap_or(DEFAULT_VELOCITY)
    }

    /// Time at which the note stops sounding.
    pub fn end(&self) -> f64 {
        self.time + self.duration_or_default()
    }

    /// The pitch parsed against the mini-notation grammar, if it fits.
    pub fn pitch_name(&self) -> Option<PitchName> {
        PitchName::parse(&self.pitch)
    }

    /// Check the numeric fields: a finite onset at or after 0, a finite
    /// positive duration and a velocity within 0-1 when present.
    ///
    /// The pitch string is not checked here; unknown names are skipped
    /// downstream instead.
    pub fn validate(&self) -> Result<()> {
        let invalid = |what: String| Err(Error::InvalidNote(format!("{:?} at {}s: {what}", self.pitch, self.time)));

        if !(self.time.is_finite() && self.time >= 0.0) {
            return invalid("onset must be a finite, non-negative time".into());
        }
        if let Some(d) = self.duration {
            if !(d.is_finite() && d > 0.0) {
                return invalid(format!("duration {d} must be finite and positive"));
            }
        }
        if let Some(v) = self.velocity {
            if !(0.0..=1.0).contains(&v) {
                return invalid(format!("velocity {v} must be within 0-1"));
            }
        }
        Ok(())
    }
}

/// A block chord produced by the progression generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Pitch names, root first.
    pub notes: Vec<String>,
    /// Chord symbol such as `C` or `Am`.
    pub name: String,
    pub time: f64,
    pub duration: f64,
}

/// Span covered by a note list: end of the last note, or 0 for no notes.
///
/// "Last" means last in sequence order, matching how the list was produced.
pub fn total_span(notes: &[Note]) -> f64 {
    notes.last().map(Note::end).unwrap_or(0.0)
}
