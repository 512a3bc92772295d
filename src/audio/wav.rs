use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};

use super::buffer::AudioBuffer;

/// Decode a WAV file into a mono [`AudioBuffer`].
///
/// Integer PCM of any width is scaled into [-1.0, 1.0]; float PCM is taken
/// as-is. Multi-channel files are averaged down to mono.
pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<hound::Result<Vec<_>>>()
                .with_context(|| format!("Failed to read samples from {}", path.display()))?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<hound::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read samples from {}", path.display()))?,
    };

    log::debug!(
        "decoded {}: {} Hz, {} ch, {} samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        interleaved.len()
    );

    let buffer = AudioBuffer::from_interleaved(&interleaved, spec.channels, spec.sample_rate)
        .with_context(|| format!("Unusable audio format in {}", path.display()))?;
    if buffer.is_empty() {
        log::warn!("{} holds no samples; it will transcribe to an empty pattern", path.display());
    }
    Ok(buffer)
}
