use crate::error::{Error, Result};

/// Decoded mono audio: the only thing the analysis core needs from a decoder.
///
/// Whatever produces one of these (WAV reader, codec library, synthetic test
/// signal) is interchangeable; pitch tracking never sees the container.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Mono samples in [-1.0, 1.0] at `sample_rate` Hz.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        Ok(Self { samples, sample_rate })
    }

    /// Average interleaved channels down to mono.
    ///
    /// A trailing partial frame (fewer samples than `channels`) is dropped.
    pub fn from_interleaved(interleaved: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        let samples = match channels {
            0 => return Err(Error::InvalidConfig("channel count must be at least 1".into())),
            1 => interleaved.to_vec(),
            n => interleaved
                .chunks_exact(n as usize)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect(),
        };
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_rejected() {
        assert_eq!(AudioBuffer::new(vec![0.0; 10], 0), Err(Error::InvalidSampleRate(0)));
    }

    #[test]
    fn duration() {
        let buf = AudioBuffer::new(vec![0.0; 22050], 44100).unwrap();
        assert_eq!(buf.duration_secs(), 0.5);
        assert!(!buf.is_empty());
    }

    #[test]
    fn stereo_mixdown_averages() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0, 0.25];
        let buf = AudioBuffer::from_interleaved(&interleaved, 2, 8000).unwrap();
        assert_eq!(buf.samples(), &[0.5, 0.5, 0.0]);
        assert_eq!(buf.sample_rate(), 8000);
    }

    #[test]
    fn mono_passes_through() {
        let buf = AudioBuffer::from_interleaved(&[0.1, 0.2], 1, 8000).unwrap();
        assert_eq!(buf.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn zero_channels_rejected() {
        assert!(AudioBuffer::from_interleaved(&[0.1], 0, 8000).is_err());
    }
}
