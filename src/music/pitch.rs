use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reference pitch for equal temperament: A4 = 440 Hz.
pub const A4_HZ: f64 = 440.0;

/// Grid index of A4. Index 0 is c0, so c4 lands on 48 and a4 on 57.
pub const A4_INDEX: i32 = 57;

/// Highest index the quantizer will produce.
pub const MAX_INDEX: i32 = 127;

/// One of the 12 tone categories, ignoring octave.
///
/// Spelling is sharp-only (`cs`, not `df`). Every downstream stage
/// (key detection, chord voicing, rendering) relies on this one spelling,
/// so there is exactly one name per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All classes in ascending order from C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitones above C (0-11).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Class for a semitone index. Any integer is accepted and wrapped mod 12.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Move up by `semitones` (negative moves down), wrapping around the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_index(self.index() as i32 + semitones)
    }

    /// Lowercase mini-notation name: `c`, `cs`, ... `b`.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "c",
            PitchClass::Cs => "cs",
            PitchClass::D => "d",
            PitchClass::Ds => "ds",
            PitchClass::E => "e",
            PitchClass::F => "f",
            PitchClass::Fs => "fs",
            PitchClass::G => "g",
            PitchClass::Gs => "gs",
            PitchClass::A => "a",
            PitchClass::As => "as",
            PitchClass::B => "b",
        }
    }

    /// Capitalised symbol used in key and chord names: `C`, `C#`, ... `B`.
    pub fn symbol(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Look up a lowercase mini-notation name. Only the 12 table entries match.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pc| pc.name() == name)
    }

    /// Resolve a letter plus optional accidental (`#`/`s` sharp, `b` flat).
    ///
    /// Flats resolve to their sharp enharmonic, so `Bb` becomes `A#`.
    /// Case-insensitive on the letter.
    pub fn from_letter(letter: char, accidental: Option<char>) -> Option<Self> {
        let natural = match letter.to_ascii_lowercase() {
            'c' => PitchClass::C,
            'd' => PitchClass::D,
            'e' => PitchClass::E,
            'f' => PitchClass::F,
            'g' => PitchClass::G,
            'a' => PitchClass::A,
            'b' => PitchClass::B,
            _ => return None,
        };
        match accidental {
            None => Some(natural),
            Some('#') | Some('s') => Some(natural.transpose(1)),
            Some('b') => Some(natural.transpose(-1)),
            Some(_) => None,
        }
    }

    /// Parse a leading tonic (`C`, `F#`, `Bb`) and return it with the unparsed rest.
    pub(crate) fn split_tonic(text: &str) -> Option<(Self, &str)> {
        let mut chars = text.chars();
        let letter = chars.next()?;
        let rest = chars.as_str();
        match rest.chars().next() {
            Some(acc @ ('#' | 'b')) => {
                let pc = Self::from_letter(letter, Some(acc))?;
                Some((pc, &rest[acc.len_utf8()..]))
            }
            _ => Some((Self::from_letter(letter, None)?, rest)),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pitch class in a specific octave, e.g. `c4` or `fs3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchName {
    pub class: PitchClass,
    pub octave: u32,
}

impl PitchName {
    pub fn new(class: PitchClass, octave: u32) -> Self {
        Self { class, octave }
    }

    /// Position on the 12-tone grid (c0 = 0, a4 = 57). The quantizer only
    /// produces 0-127, but parsed names can sit anywhere above that.
    pub fn grid_index(self) -> i64 {
        self.octave as i64 * 12 + self.class.index() as i64
    }

    /// Equal-tempered frequency of this pitch.
    pub fn frequency(self) -> f64 {
        A4_HZ * 2f64.powf((self.grid_index() - A4_INDEX as i64) as f64 / 12.0)
    }

    /// Parse the mini-notation grammar: a class name from the 12-name table
    /// followed by a decimal octave, nothing else. Any digit run that fits
    /// a `u32` is an octave, so `c300` parses even though no frequency
    /// quantizes to it.
    ///
    /// Returns `None` for anything outside the grammar; the caller decides
    /// whether that means "skip" or "fail".
    pub fn parse(text: &str) -> Option<Self> {
        let digits_at = text.find(|c: char| c.is_ascii_digit())?;
        let (class, octave) = text.split_at(digits_at);
        if class.is_empty() || !octave.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let class = PitchClass::from_name(class)?;
        let octave: u32 = octave.parse().ok()?;
        Some(Self { class, octave })
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.name(), self.octave)
    }
}

impl FromStr for PitchName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidNote(format!("unknown pitch name {s:?}")))
    }
}

/// Snap a frequency to the nearest pitch on the 12-tone grid.
///
/// halfSteps = round(12 * log2(f / 440)), index = halfSteps + 57.
/// Returns `None` for f <= 0 (the estimator's "no pitch") and for anything
/// that falls off the 0-127 grid.
pub fn quantize_frequency(frequency: f64) -> Option<PitchName> {
    if !(frequency > 0.0) || !frequency.is_finite() {
        return None;
    }

    let half_steps = (12.0 * (frequency / A4_HZ).log2()).round();
    let index = half_steps as i64 + A4_INDEX as i64;
    if !(0..=MAX_INDEX as i64).contains(&index) {
        return None;
    }

    let index = index as i32;
    Some(PitchName {
        class: PitchClass::from_index(index),
        octave: (index / 12) as u32,
    })
}

/// String form of [`quantize_frequency`].
pub fn to_note_name(frequency: f64) -> Option<String> {
    quantize_frequency(frequency).map(|p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a440_is_a4() {
        assert_eq!(to_note_name(440.0).as_deref(), Some("a4"));
    }

    #[test]
    fn middle_c() {
        assert_eq!(to_note_name(261.63).as_deref(), Some("c4"));
        // A quarter-tone flat still rounds to c4
        assert_eq!(to_note_name(255.0).as_deref(), Some("c4"));
    }

    #[test]
    fn sharps_use_s_spelling() {
        assert_eq!(to_note_name(277.18).as_deref(), Some("cs4"));
        assert_eq!(to_note_name(466.16).as_deref(), Some("as4"));
    }

    #[test]
    fn nonpositive_frequency_fails() {
        assert_eq!(to_note_name(0.0), None);
        assert_eq!(to_note_name(-10.0), None);
        assert_eq!(to_note_name(f64::NAN), None);
    }

    #[test]
    fn out_of_grid_fails() {
        // Index 0 is c0 ~16.35 Hz; far below drops off the grid.
        assert_eq!(to_note_name(1.0), None);
        // Index 127 is g10 ~ 25 kHz; 40 kHz is off the top.
        assert_eq!(to_note_name(40_000.0), None);
    }

    #[test]
    fn octave_is_monotonic_across_octaves() {
        let mut freq = 20.0;
        let mut last_octave = 0;
        while freq < 20_000.0 {
            let pitch = quantize_frequency(freq).unwrap();
            assert!(pitch.octave >= last_octave, "octave went down at {freq} Hz");
            last_octave = pitch.octave;
            freq *= 2.0;
        }
    }

    #[test]
    fn frequency_roundtrips_through_grid() {
        for index in 12..=120 {
            let pitch = PitchName::new(PitchClass::from_index(index), (index / 12) as u32);
            assert_eq!(quantize_frequency(pitch.frequency()), Some(pitch));
        }
    }

    #[test]
    fn parse_accepts_table_names_only() {
        assert_eq!(PitchName::parse("c4"), Some(PitchName::new(PitchClass::C, 4)));
        assert_eq!(PitchName::parse("fs3"), Some(PitchName::new(PitchClass::Fs, 3)));
        assert_eq!(PitchName::parse("as10"), Some(PitchName::new(PitchClass::As, 10)));
        assert_eq!(PitchName::parse("es4"), None);
        assert_eq!(PitchName::parse("C4"), None);
        assert_eq!(PitchName::parse("c#4"), None);
        assert_eq!(PitchName::parse("c"), None);
        assert_eq!(PitchName::parse("4"), None);
        assert_eq!(PitchName::parse("c4x"), None);
        assert_eq!(PitchName::parse(""), None);
    }

    #[test]
    fn octave_is_any_digit_run() {
        assert_eq!(PitchName::parse("c300"), Some(PitchName::new(PitchClass::C, 300)));
        assert_eq!(PitchName::parse("gs042"), Some(PitchName::new(PitchClass::Gs, 42)));
        assert!(PitchName::new(PitchClass::C, 300).grid_index() > MAX_INDEX as i64);
    }

    #[test]
    fn from_str_reports_the_name() {
        assert_eq!("ds5".parse::<PitchName>(), Ok(PitchName::new(PitchClass::Ds, 5)));
        let err = "h4".parse::<PitchName>().unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("\"h4\""), "got {err}");
    }

    #[test]
    fn every_class_name_roundtrips() {
        for pc in PitchClass::ALL {
            assert_eq!(PitchClass::from_name(pc.name()), Some(pc));
        }
    }

    #[test]
    fn letters_and_accidentals() {
        assert_eq!(PitchClass::from_letter('B', Some('b')), Some(PitchClass::As));
        assert_eq!(PitchClass::from_letter('c', Some('b')), Some(PitchClass::B));
        assert_eq!(PitchClass::from_letter('E', Some('#')), Some(PitchClass::F));
        assert_eq!(PitchClass::from_letter('H', None), None);
        assert_eq!(PitchClass::from_letter('C', Some('x')), None);
    }

    #[test]
    fn split_tonic_leaves_suffix() {
        assert_eq!(PitchClass::split_tonic("F#m"), Some((PitchClass::Fs, "m")));
        assert_eq!(PitchClass::split_tonic("Bbmaj7"), Some((PitchClass::As, "maj7")));
        assert_eq!(PitchClass::split_tonic("Am"), Some((PitchClass::A, "m")));
        assert_eq!(PitchClass::split_tonic("Xm"), None);
    }
}
