use crate::music::note::Note;

/// Tempo used when the notes don't say enough.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Folding range for estimates: [MIN, MAX).
const MIN_BPM: f64 = 70.0;
const MAX_BPM: f64 = 180.0;

/// Onsets closer than this are treated as one.
const MIN_IOI_SECS: f64 = 0.05;

/// Rough tempo from note onsets.
///
/// Takes the median inter-onset interval as one beat, converts it to BPM
/// and folds by octaves into 70-180 BPM, then rounds to a whole number.
/// Fewer than two distinct onsets returns `fallback`.
pub fn estimate_tempo(notes: &[Note], fallback: f64) -> f64 {
    let mut onsets: Vec<f64> = notes.iter().map(|n| n.time).collect();
    onsets.sort_by(f64::total_cmp);

    let mut intervals: Vec<f64> = onsets
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&ioi| ioi >= MIN_IOI_SECS)
        .collect();

    if intervals.is_empty() {
        log::debug!("not enough onsets for a tempo estimate, using {fallback} BPM");
        return fallback;
    }

    intervals.sort_by(f64::total_cmp);
    let median = intervals[intervals.len() / 2];

    let mut bpm = 60.0 / median;
    if !(bpm.is_finite() && bpm > 0.0) {
        log::debug!("median onset gap {median} gives no usable tempo, using {fallback} BPM");
        return fallback;
    }
    while bpm < MIN_BPM {
        bpm *= 2.0;
    }
    while bpm >= MAX_BPM {
        bpm /= 2.0;
    }

    let bpm = bpm.round();
    log::debug!("estimated tempo {bpm} BPM from median onset gap {median:.3}s");
    bpm
}
