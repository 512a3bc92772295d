use crate::error::{Error, Result};

/// Default lowest tracked fundamental. Anything below is ignored on purpose:
/// the period range (and so the cost per frame) grows as the floor drops.
pub const DEFAULT_MIN_FREQ_HZ: f64 = 80.0;

/// Default highest tracked fundamental.
pub const DEFAULT_MAX_FREQ_HZ: f64 = 1000.0;

/// Largest clarity threshold, reached at sensitivity 0.
const MAX_CLARITY_THRESHOLD: f64 = 0.6;

/// Single-frame fundamental frequency estimator.
///
/// Plain time-domain autocorrelation: for every candidate period `p` between
/// `sample_rate / max_freq` and `sample_rate / min_freq` (and below half the
/// frame) it sums `frame[i] * frame[i + p]` over the overlap, then keeps the
/// period with the largest sum. No FFT: frames are short and the period range
/// is bounded, so the O(frame * periods) loop is fine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimator {
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,

    /// Fraction of the zero-lag energy the winning correlation must exceed.
    /// 0.0 accepts any positive correlation.
    pub clarity_threshold: f64,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self {
            min_freq_hz: DEFAULT_MIN_FREQ_HZ,
            max_freq_hz: DEFAULT_MAX_FREQ_HZ,
            clarity_threshold: 0.0,
        }
    }
}

impl PitchEstimator {
    /// Map a 0-100 sensitivity onto the clarity threshold.
    ///
    /// 100 accepts any positive correlation, 0 demands the peak carry 60% of
    /// the frame energy. Values outside 0-100 are rejected.
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Result<Self> {
        let sensitivity = crate::error::check_sensitivity(sensitivity)?;
        self.clarity_threshold = MAX_CLARITY_THRESHOLD * (100.0 - sensitivity) / 100.0;
        Ok(self)
    }

    /// Inclusive candidate period range in samples.
    fn period_range(&self, sample_rate: u32) -> (usize, usize) {
        let sr = sample_rate as f64;
        let shortest = (sr / self.max_freq_hz).floor() as usize;
        let longest = (sr / self.min_freq_hz).floor() as usize;
        (shortest.max(1), longest)
    }

    /// Dominant frequency of `frame` in Hz, or 0.0 when nothing periodic was found.
    ///
    /// 0.0 means "no pitch", never a note. Silence gives 0 correlation at
    /// every period and so lands here too. Ties go to the shortest period.
    pub fn estimate(&self, frame: &[f32], sample_rate: u32) -> Result<f64> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let (shortest, longest) = self.period_range(sample_rate);
        let half = frame.len() / 2;

        let mut best_period = 0;
        let mut best_corr = 0.0;

        for period in shortest..=longest {
            if period >= half {
                break;
            }
            let corr = autocorrelation(frame, period);
            if corr > best_corr {
                best_corr = corr;
                best_period = period;
            }
        }

        if best_period == 0 {
            return Ok(0.0);
        }

        if self.clarity_threshold > 0.0 {
            let energy = autocorrelation(frame, 0);
            if best_corr <= self.clarity_threshold * energy {
                log::trace!(
                    "rejecting period {best_period}: clarity {:.3} below {:.3}",
                    best_corr / energy,
                    self.clarity_threshold
                );
                return Ok(0.0);
            }
        }

        Ok(sample_rate as f64 / best_period as f64)
    }
}

/// Unnormalised autocorrelation at one lag.
fn autocorrelation(frame: &[f32], lag: usize) -> f64 {
    frame
        .iter()
        .zip(&frame[lag.min(frame.len())..])
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum()
}

/// How the audio is cut into frames for pitch tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchConfig {
    pub estimator: PitchEstimator,

    /// Analysis frame length in milliseconds.
    /// Must hold several periods of the floor frequency, otherwise the very
    /// short lags win on overlap alone.
    pub frame_size_ms: f64,

    /// Step between frame starts in milliseconds.
    pub hop_size_ms: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            estimator: PitchEstimator::default(),
            frame_size_ms: 150.0,
            hop_size_ms: 50.0,
        }
    }
}

impl PitchConfig {
    /// Frame and hop lengths in samples at `sample_rate`, both at least 1.
    pub fn frame_and_hop(&self, sample_rate: u32) -> (usize, usize) {
        let sr = sample_rate as f64;
        let frame = ((self.frame_size_ms / 1000.0 * sr) as usize).max(1);
        let hop = ((self.hop_size_ms / 1000.0 * sr) as usize).max(1);
        (frame, hop)
    }
}

/// A single point in a pitch contour.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchFrame {
    /// Frame start in seconds.
    pub time: f64,
    /// Estimated fundamental, `None` when the estimator returned 0.
    pub frequency: Option<f64>,
    /// Linear RMS of the frame.
    pub rms: f32,
}

/// Slide a frame across the buffer and estimate one pitch per hop.
///
/// Only whole frames are analysed; a buffer shorter than one frame is
/// analysed as a single short frame so brief clips still get a chance.
pub fn extract_pitch_contour(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Result<Vec<PitchFrame>> {
    if sample_rate == 0 {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let sr = sample_rate as f64;
    let (frame_size, hop_size) = config.frame_and_hop(sample_rate);
    let frame_size = frame_size.min(samples.len());

    let mut contour = Vec::new();
    let mut pos = 0;

    while pos + frame_size <= samples.len() {
        let frame = &samples[pos..pos + frame_size];
        let estimate = config.estimator.estimate(frame, sample_rate)?;
        let frequency = (estimate > 0.0).then_some(estimate);

        log::trace!("frame @{pos}: {estimate:.1} Hz");
        contour.push(PitchFrame {
            time: pos as f64 / sr,
            frequency,
            rms: frame_rms(frame),
        });
        pos += hop_size;
    }

    Ok(contour)
}

/// RMS of a sample buffer (linear, not dB).
pub fn frame_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Fraction of frames with a detected pitch. 0.0 for an empty contour.
pub fn voiced_fraction(contour: &[PitchFrame]) -> f32 {
    if contour.is_empty() {
        return 0.0;
    }
    let voiced = contour.iter().filter(|f| f.frequency.is_some()).count();
    voiced as f32 / contour.len() as f32
}
