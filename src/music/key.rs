use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::note::Note;
use super::pitch::PitchClass;
use crate::error::Error;

/// Major or minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

/// One of the 24 keys: 12 tonics in major or minor.
///
/// Displays as the sharp-spelled tonic with an `m` suffix for minor
/// (`C`, `F#m`). That string form is the canonical one and the only form
/// the crate ever produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl Key {
    pub const C_MAJOR: Key = Key::major(PitchClass::C);

    pub const fn major(tonic: PitchClass) -> Self {
        Self { tonic, mode: Mode::Major }
    }

    pub const fn minor(tonic: PitchClass) -> Self {
        Self { tonic, mode: Mode::Minor }
    }

    pub fn is_minor(self) -> bool {
        self.mode == Mode::Minor
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self {
            tonic: self.tonic.transpose(semitones),
            mode: self.mode,
        }
    }

    /// All 24 keys, major before minor for each tonic, tonics ascending from C.
    pub fn all() -> impl Iterator<Item = Key> {
        PitchClass::ALL
            .into_iter()
            .flat_map(|pc| [Key::major(pc), Key::minor(pc)])
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tonic.symbol())?;
        if self.is_minor() {
            f.write_str("m")?;
        }
        Ok(())
    }
}

impl FromStr for Key {
    type Err = Error;

    /// Accepts `C`, `F#m`, `Bb`, `Ebm`, and the long forms `A minor`,
    /// `Amin`, `C major`, `Cmaj`. Flats normalise to sharps.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidKey(s.to_string());
        let (tonic, rest) = PitchClass::split_tonic(s.trim()).ok_or_else(invalid)?;

        let mode = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" => Mode::Major,
            "m" | "min" | "minor" => Mode::Minor,
            _ => return Err(invalid()),
        };
        Ok(Key { tonic, mode })
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reference pitch-class weights for one tonic (index 0 = tonic).
#[derive(Debug, Clone, PartialEq)]
pub struct TonalProfiles {
    pub major: [f64; 12],
    pub minor: [f64; 12],
}

/// Krumhansl-Kessler probe-tone ratings.
pub static KRUMHANSL_KESSLER: TonalProfiles = TonalProfiles {
    major: [
        6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
    ],
    minor: [
        6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
    ],
};

/// Weighted 12-bin chroma histogram.
///
/// Each note whose pitch fits the grammar adds duration * velocity to its
/// class. Notes with unparseable names are skipped.
pub fn chroma_histogram(notes: &[Note]) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for note in notes {
        let Some(pitch) = note.pitch_name() else {
            log::trace!("skipping unparseable pitch {:?}", note.pitch);
            continue;
        };
        histogram[pitch.class.index()] += note.duration_or_default() * note.velocity_or_default();
    }
    histogram
}

/// Picks the key whose profile best matches a note list.
///
/// Holds the profiles by shared reference; one set of tables serves every
/// detector for the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct KeyDetector<'a> {
    profiles: &'a TonalProfiles,
}

impl Default for KeyDetector<'static> {
    fn default() -> Self {
        Self::new(&KRUMHANSL_KESSLER)
    }
}

impl<'a> KeyDetector<'a> {
    pub fn new(profiles: &'a TonalProfiles) -> Self {
        Self { profiles }
    }

    /// Dot product of the histogram, rotated so `tonic` sits at index 0,
    /// against one mode's profile.
    pub fn correlate(&self, histogram: &[f64; 12], key: Key) -> f64 {
        let profile = match key.mode {
            Mode::Major => &self.profiles.major,
            Mode::Minor => &self.profiles.minor,
        };
        let shift = key.tonic.index();
        profile
            .iter()
            .enumerate()
            .map(|(i, weight)| histogram[(i + shift) % 12] * weight)
            .sum()
    }

    /// Best-fitting key for the notes.
    ///
    /// Tonics are scanned ascending from C, major before minor, and a later
    /// candidate only wins with a strictly higher score. An empty histogram
    /// scores 0 everywhere and therefore yields C major.
    pub fn detect(&self, notes: &[Note]) -> Key {
        let histogram = chroma_histogram(notes);

        let mut best = Key::C_MAJOR;
        let mut best_score = f64::NEG_INFINITY;
        for key in Key::all() {
            let score = self.correlate(&histogram, key);
            if score > best_score {
                best = key;
                best_score = score;
            }
        }

        log::debug!("detected key {best} (score {best_score:.3}) from {} notes", notes.len());
        best
    }
}

/// Detect with the built-in Krumhansl-Kessler profiles.
pub fn detect_key(notes: &[Note]) -> Key {
    KeyDetector::default().detect(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_from(names: &[&str]) -> Vec<Note> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Note::new(*name, i as f64 * 0.5).with_duration(0.5))
            .collect()
    }

    #[test]
    fn display_forms() {
        assert_eq!(Key::major(PitchClass::C).to_string(), "C");
        assert_eq!(Key::minor(PitchClass::Fs).to_string(), "F#m");
        assert_eq!(Key::minor(PitchClass::A).to_string(), "Am");
    }

    #[test]
    fn parse_canonical_and_long_forms() {
        assert_eq!("C".parse::<Key>(), Ok(Key::major(PitchClass::C)));
        assert_eq!("Am".parse::<Key>(), Ok(Key::minor(PitchClass::A)));
        assert_eq!("Bb".parse::<Key>(), Ok(Key::major(PitchClass::As)));
        assert_eq!("Ebm".parse::<Key>(), Ok(Key::minor(PitchClass::Ds)));
        assert_eq!("A minor".parse::<Key>(), Ok(Key::minor(PitchClass::A)));
        assert_eq!("G major".parse::<Key>(), Ok(Key::major(PitchClass::G)));
    }

    #[test]
    fn parse_rejects_junk() {
        for bad in ["", "H", "Cx", "C dorian", "m"] {
            let err = bad.parse::<Key>().unwrap_err();
            assert!(err.is_invalid_argument(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn all_24_canonical_forms_roundtrip() {
        let keys: Vec<Key> = Key::all().collect();
        assert_eq!(keys.len(), 24);
        for key in keys {
            assert_eq!(key.to_string().parse::<Key>(), Ok(key));
        }
    }

    #[test]
    fn c_major_scale_is_c() {
        let notes = notes_from(&["c4", "d4", "e4", "f4", "g4", "a4", "b4", "c5", "g4", "c4"]);
        assert_eq!(detect_key(&notes), Key::major(PitchClass::C));
    }

    #[test]
    fn a_minor_arpeggio_is_a_minor() {
        let notes = notes_from(&["a3", "c4", "e4", "a4", "e4", "c4", "a3", "gs3", "a3"]);
        assert_eq!(detect_key(&notes), Key::minor(PitchClass::A));
    }

    #[test]
    fn empty_input_is_c_major() {
        assert_eq!(detect_key(&[]), Key::C_MAJOR);
    }

    #[test]
    fn unparseable_notes_are_skipped() {
        let mut notes = notes_from(&["c4", "e4", "g4", "c5"]);
        let baseline = detect_key(&notes);
        notes.push(Note::new("not-a-pitch", 3.0).with_duration(10.0));
        notes.push(Note::new("C#4", 3.0).with_duration(10.0));
        assert_eq!(detect_key(&notes), baseline);
    }

    #[test]
    fn histogram_weights_duration_and_velocity() {
        let notes = vec![
            Note::new("c4", 0.0).with_duration(1.0).with_velocity(0.5),
            Note::new("c5", 1.0),
            Note::new("g4", 2.0).with_duration(2.0).with_velocity(1.0),
        ];
        let hist = chroma_histogram(&notes);
        assert!((hist[0] - (0.5 + 0.25 * 0.8)).abs() < 1e-12);
        assert!((hist[7] - 2.0).abs() < 1e-12);
        assert_eq!(hist.iter().filter(|&&v| v != 0.0).count(), 2);
    }

    #[test]
    fn detection_is_rotation_consistent() {
        let base = ["c4", "d4", "e4", "f4", "g4", "a4", "b4", "c5", "e4", "g4"];
        let base_notes = notes_from(&base);
        let base_key = detect_key(&base_notes);

        for k in 0..12 {
            let shifted: Vec<Note> = base_notes
                .iter()
                .map(|n| {
                    let p = n.pitch_name().unwrap();
                    let moved = p.class.transpose(k);
                    Note { pitch: format!("{}{}", moved.name(), p.octave), ..n.clone() }
                })
                .collect();
            assert_eq!(detect_key(&shifted), base_key.transpose(k), "shift by {k}");
        }
    }

    #[test]
    fn minor_rotation_consistent_too() {
        let base_notes = notes_from(&["a3", "c4", "e4", "a4", "d4", "f4", "e4", "gs3", "a3"]);
        let base_key = detect_key(&base_notes);
        assert!(base_key.is_minor());

        for k in 1..12 {
            let shifted: Vec<Note> = base_notes
                .iter()
                .map(|n| {
                    let p = n.pitch_name().unwrap();
                    Note { pitch: format!("{}{}", p.class.transpose(k).name(), p.octave), ..n.clone() }
                })
                .collect();
            let key = detect_key(&shifted);
            assert_eq!(key, base_key.transpose(k));
            assert!(key.is_minor());
        }
    }

    fn chromatic_scale() -> Vec<Note> {
        PitchClass::ALL
            .iter()
            .enumerate()
            .map(|(i, pc)| Note::new(format!("{}4", pc.name()), i as f64))
            .collect()
    }

    #[test]
    fn flat_histogram_picks_c_of_the_heavier_mode() {
        // Every tonic ties, so C wins; the minor profile sums higher
        // (44.51 against 41.79), so minor beats major outright.
        assert_eq!(detect_key(&chromatic_scale()), Key::minor(PitchClass::C));
    }

    #[test]
    fn ties_resolve_to_first_scanned() {
        // Identical profiles tie all 24 keys; the first scanned is C major.
        let flat = TonalProfiles {
            major: KRUMHANSL_KESSLER.major,
            minor: KRUMHANSL_KESSLER.major,
        };
        let detector = KeyDetector::new(&flat);
        assert_eq!(detector.detect(&chromatic_scale()), Key::C_MAJOR);

        // Same tie between the modes of one tonic: major comes first.
        let notes = notes_from(&["g4", "b4", "d5", "g3"]);
        let key = detector.detect(&notes);
        assert_eq!(key.mode, Mode::Major);
    }

    #[test]
    fn serde_uses_canonical_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            key: Key,
        }
        let text = toml::to_string(&Wrapper { key: Key::minor(PitchClass::Cs) }).unwrap();
        assert!(text.contains("\"C#m\""), "got {text}");
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.key, Key::minor(PitchClass::Cs));
    }
}
