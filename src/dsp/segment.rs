use super::pitch::PitchFrame;
use crate::music::note::Note;
use crate::music::pitch::{quantize_frequency, PitchName};

/// Find runs of consecutive frames that quantize to the same pitch.
/// Returns `(start, end, pitch)` with `end` inclusive.
///
/// Unvoiced frames and frequencies off the grid break a run.
pub fn pitch_runs(contour: &[PitchFrame]) -> Vec<(usize, usize, PitchName)> {
    let mut runs = Vec::new();
    let mut current: Option<(usize, PitchName)> = None;

    for (i, frame) in contour.iter().enumerate() {
        let pitch = frame.frequency.and_then(quantize_frequency);

        match (current, pitch) {
            (Some((_, held)), Some(p)) if held == p => {}
            (Some((start, held)), next) => {
                runs.push((start, i - 1, held));
                current = next.map(|p| (i, p));
            }
            (None, next) => current = next.map(|p| (i, p)),
        }
    }

    if let Some((start, held)) = current {
        runs.push((start, contour.len() - 1, held));
    }

    runs
}

/// Turn a pitch contour into notes.
///
/// Each run of identical pitches becomes one note starting at the run's
/// first frame and lasting `frames * hop`. Runs shorter than `min_note_ms`
/// are dropped as flicker. Velocity is the run's mean RMS relative to the
/// loudest frame in the contour.
pub fn notes_from_contour(contour: &[PitchFrame], hop_size_ms: f64, min_note_ms: f64) -> Vec<Note> {
    let hop_secs = hop_size_ms / 1000.0;
    let min_secs = min_note_ms / 1000.0;
    let peak_rms = contour.iter().map(|f| f.rms).fold(0.0_f32, f32::max);

    pitch_runs(contour)
        .into_iter()
        .filter_map(|(start, end, pitch)| {
            let frames = &contour[start..=end];
            let duration = frames.len() as f64 * hop_secs;
            if duration + 1e-9 < min_secs {
                return None;
            }

            let mean_rms = frames.iter().map(|f| f.rms).sum::<f32>() / frames.len() as f32;
            let mut note = Note::new(pitch.to_string(), frames[0].time).with_duration(duration);
            if peak_rms > 0.0 {
                note = note.with_velocity((mean_rms / peak_rms).clamp(0.0, 1.0) as f64);
            }
            Some(note)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: f64, frequency: Option<f64>, rms: f32) -> PitchFrame {
        PitchFrame { time, frequency, rms }
    }

    #[test]
    fn runs_split_on_pitch_change_and_silence() {
        let contour = vec![
            frame(0.00, Some(440.0), 0.5),
            frame(0.05, Some(442.0), 0.5),
            frame(0.10, Some(523.3), 0.5),
            frame(0.15, None, 0.0),
            frame(0.20, Some(523.3), 0.5),
        ];
        let runs: Vec<(usize, usize, String)> = pitch_runs(&contour)
            .into_iter()
            .map(|(s, e, p)| (s, e, p.to_string()))
            .collect();
        assert_eq!(
            runs,
            [(0, 1, "a4".to_string()), (2, 2, "c5".to_string()), (4, 4, "c5".to_string())]
        );
    }

    #[test]
    fn empty_contour_has_no_runs() {
        assert!(pitch_runs(&[]).is_empty());
        assert!(notes_from_contour(&[], 50.0, 100.0).is_empty());
    }

    #[test]
    fn short_runs_are_dropped() {
        let contour = vec![
            frame(0.00, Some(440.0), 1.0),
            frame(0.05, Some(440.0), 1.0),
            frame(0.10, Some(660.0), 1.0),
            frame(0.15, Some(440.0), 0.5),
            frame(0.20, Some(440.0), 0.5),
            frame(0.25, Some(440.0), 0.5),
        ];
        let notes = notes_from_contour(&contour, 50.0, 100.0);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].pitch, "a4");
        assert!((notes[0].duration_or_default() - 0.10).abs() < 1e-9);
        assert_eq!(notes[1].time, 0.15);
        assert!((notes[1].duration_or_default() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn velocity_is_relative_to_peak() {
        let contour = vec![
            frame(0.0, Some(440.0), 0.8),
            frame(0.05, Some(440.0), 0.8),
            frame(0.10, Some(330.0), 0.2),
            frame(0.15, Some(330.0), 0.2),
        ];
        let notes = notes_from_contour(&contour, 50.0, 0.0);
        assert!((notes[0].velocity_or_default() - 1.0).abs() < 1e-6);
        assert!((notes[1].velocity_or_default() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn unvoiced_contour_makes_no_notes() {
        let contour: Vec<PitchFrame> = (0..10).map(|i| frame(i as f64 * 0.05, None, 0.0)).collect();
        assert!(notes_from_contour(&contour, 50.0, 0.0).is_empty());
    }
}
