//! Decoder boundary: a mono sample buffer plus its rate, and a WAV reader that fills one.

pub mod buffer;
pub mod wav;

pub use buffer::AudioBuffer;
