//! One-unit orchestration: audio or notes in, result and pattern text out.

pub mod pipeline;
pub mod result;

pub use pipeline::{AnalysisInput, AnalysisOptions, AnalysisPipeline};
pub use result::{AnalysisResult, Transcription};
