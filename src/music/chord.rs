use super::key::{Key, Mode};
use super::note::{total_span, Chord, Note};
use super::pitch::{PitchClass, PitchName};

/// Notes needed before a progression is generated.
pub const MIN_NOTES_FOR_HARMONY: usize = 4;

/// Every chord tone is voiced in this octave.
pub const CHORD_OCTAVE: u32 = 4;

const MAJOR_TRIAD: [i32; 3] = [0, 4, 7];
const MINOR_TRIAD: [i32; 3] = [0, 3, 7];

/// Four-chord progressions for the keys we have written out.
///
/// Major keys use I-vi-IV-V, minor keys i-VI-III-VII.
/// Anything else falls back to the C major row.
fn progression_table(key: Key) -> Option<&'static [&'static str; 4]> {
    use PitchClass::*;

    let row: &'static [&'static str; 4] = match (key.tonic, key.mode) {
        (C, Mode::Major) => &["C", "Am", "F", "G"],
        (G, Mode::Major) => &["G", "Em", "C", "D"],
        (D, Mode::Major) => &["D", "Bm", "G", "A"],
        (A, Mode::Major) => &["A", "F#m", "D", "E"],
        (E, Mode::Major) => &["E", "C#m", "A", "B"],
        (F, Mode::Major) => &["F", "Dm", "Bb", "C"],
        (As, Mode::Major) => &["Bb", "Gm", "Eb", "F"],
        (A, Mode::Minor) => &["Am", "F", "C", "G"],
        (E, Mode::Minor) => &["Em", "C", "G", "D"],
        (D, Mode::Minor) => &["Dm", "Bb", "F", "C"],
        (B, Mode::Minor) => &["Bm", "G", "D", "A"],
        (G, Mode::Minor) => &["Gm", "Eb", "Bb", "F"],
        _ => return None,
    };
    Some(row)
}

/// Chord symbols for `key`, falling back to the C major progression.
pub fn progression_for(key: Key) -> &'static [&'static str; 4] {
    progression_table(key).unwrap_or_else(|| {
        log::debug!("no progression written for key {key}, using C");
        progression_table(Key::C_MAJOR).unwrap_or(&["C", "Am", "F", "G"])
    })
}

/// A parsed chord symbol: root plus triad quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordSymbol {
    pub root: PitchClass,
    pub minor: bool,
}

impl ChordSymbol {
    /// Minor iff the symbol ends in `m` and isn't a `maj` chord.
    /// `None` if the root doesn't resolve to one of the 12 classes.
    pub fn parse(symbol: &str) -> Option<Self> {
        let minor = symbol.ends_with('m') && !symbol.contains("maj");
        let (root, _) = PitchClass::split_tonic(symbol)?;
        Some(Self { root, minor })
    }

    /// Chord tones root first, all in [`CHORD_OCTAVE`].
    pub fn pitches(self) -> Vec<PitchName> {
        let intervals = if self.minor { MINOR_TRIAD } else { MAJOR_TRIAD };
        intervals
            .iter()
            .map(|&i| PitchName::new(self.root.transpose(i), CHORD_OCTAVE))
            .collect()
    }
}

/// Lay the key's progression over the notes as an even grid.
///
/// The total span (end of the last note) is split into one equal slot per
/// chord. Fewer than [`MIN_NOTES_FOR_HARMONY`] notes gives no chords.
/// Symbols whose root doesn't resolve are dropped, leaving their slot empty.
pub fn generate_chords(notes: &[Note], key: Key) -> Vec<Chord> {
    if notes.len() < MIN_NOTES_FOR_HARMONY {
        return Vec::new();
    }
    layout(progression_for(key), total_span(notes))
}

fn layout(progression: &[&str], span: f64) -> Vec<Chord> {
    let slot = span / progression.len() as f64;

    progression
        .iter()
        .enumerate()
        .filter_map(|(i, &symbol)| {
            let Some(parsed) = ChordSymbol::parse(symbol) else {
                log::debug!("dropping chord {symbol:?}: unknown root");
                return None;
            };
            Some(Chord {
                notes: parsed.pitches().iter().map(ToString::to_string).collect(),
                name: symbol.to_string(),
                time: i as f64 * slot,
                duration: slot,
            })
        })
        .collect()
}
