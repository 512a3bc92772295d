//! Pattern mini-notation output.

pub mod render;

pub use render::{format_pitch, quantize_multiplier, NotationRenderer, RenderedPattern, TimeSignature};
