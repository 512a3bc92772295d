use thiserror::Error;

/// Contract violations on explicit parameters.
///
/// Algorithmic degeneracies (silence, empty note lists, unknown chord
/// symbols) never show up here. They degrade to well-defined defaults
/// inside the stage that meets them. Only values the caller handed us
/// directly can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid sample rate: {0} Hz (must be positive)")]
    InvalidSampleRate(u32),

    #[error("invalid tempo: {0} BPM (must be a positive finite number)")]
    InvalidTempo(f64),

    #[error("invalid time signature {0:?} (expected \"N/D\" with positive integers)")]
    InvalidTimeSignature(String),

    #[error("invalid key {0:?} (expected a tonic like \"C\", \"F#\" or \"Bb\", optionally followed by \"m\")")]
    InvalidKey(String),

    #[error("invalid sensitivity {0} (must be within 0-100)")]
    InvalidSensitivity(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid note: {0}")]
    InvalidNote(String),
}

impl Error {
    /// Every variant is a caller contract violation.
    /// Kept as a method so hosts can match on the class rather than the variant.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidSampleRate(_)
                | Error::InvalidTempo(_)
                | Error::InvalidTimeSignature(_)
                | Error::InvalidKey(_)
                | Error::InvalidSensitivity(_)
                | Error::InvalidConfig(_)
                | Error::InvalidNote(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject non-finite or non-positive tempos.
pub(crate) fn check_tempo(bpm: f64) -> Result<f64> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(Error::InvalidTempo(bpm))
    }
}

/// Reject sensitivities outside 0-100.
pub(crate) fn check_sensitivity(sensitivity: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&sensitivity) {
        Ok(sensitivity)
    } else {
        Err(Error::InvalidSensitivity(sensitivity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_must_be_positive() {
        assert_eq!(check_tempo(120.0), Ok(120.0));
        assert_eq!(check_tempo(0.0), Err(Error::InvalidTempo(0.0)));
        assert!(check_tempo(-3.0).is_err());
        assert!(check_tempo(f64::NAN).is_err());
        assert!(check_tempo(f64::INFINITY).is_err());
    }

    #[test]
    fn sensitivity_range() {
        assert!(check_sensitivity(0.0).is_ok());
        assert!(check_sensitivity(100.0).is_ok());
        assert!(check_sensitivity(100.5).is_err());
        assert!(check_sensitivity(-1.0).is_err());
    }

    #[test]
    fn all_variants_are_invalid_argument() {
        assert!(Error::InvalidSampleRate(0).is_invalid_argument());
        assert!(Error::InvalidKey("H".into()).is_invalid_argument());
        assert!(Error::InvalidNote("c4 at -1s".into()).is_invalid_argument());
    }

    #[test]
    fn messages_name_the_value() {
        let msg = Error::InvalidTimeSignature("4-4".into()).to_string();
        assert!(msg.contains("\"4-4\""), "got {msg}");
    }
}
