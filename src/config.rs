use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dsp::pitch::{PitchConfig, PitchEstimator};
use crate::error::Error;
use crate::notation::render::{TimeSignature, DEFAULT_SOUND};
use crate::paths;

/// Application configuration, loaded from config.toml.
///
/// Every section carries `#[serde(default)]`, so a missing field (or a
/// missing file) falls back to the Default implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lowest tracked fundamental (Hz).
    pub pitch_floor_hz: f64,
    /// Highest tracked fundamental (Hz).
    pub pitch_ceiling_hz: f64,
    /// Analysis frame length. Needs several periods of the floor.
    pub frame_size_ms: f64,
    pub hop_size_ms: f64,
    /// Pitch runs shorter than this are dropped.
    pub min_note_ms: f64,
    /// 0-100; higher accepts weaker periodicity as pitch.
    pub sensitivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Meter as "N/D".
    pub time_signature: String,
    /// Instrument name for `.sound(...)`.
    pub sound: String,
    /// Tempo when the notes are too sparse to estimate one.
    pub default_tempo: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pitch_floor_hz: 80.0,
            pitch_ceiling_hz: 1000.0,
            frame_size_ms: 150.0,
            hop_size_ms: 50.0,
            min_note_ms: 100.0,
            sensitivity: 50.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            time_signature: "4/4".into(),
            sound: DEFAULT_SOUND.into(),
            default_tempo: 120.0,
        }
    }
}

impl AppConfig {
    /// Reject values the pipeline can't work with.
    pub fn validate(&self) -> crate::Result<()> {
        let a = &self.analysis;
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if !(a.pitch_floor_hz > 0.0 && a.pitch_floor_hz < a.pitch_ceiling_hz) {
            return invalid(format!(
                "pitch range {}-{} Hz is empty or non-positive",
                a.pitch_floor_hz, a.pitch_ceiling_hz
            ));
        }
        if !(a.frame_size_ms > 0.0 && a.hop_size_ms > 0.0) {
            return invalid("frame_size_ms and hop_size_ms must be positive".into());
        }
        if !(a.min_note_ms >= 0.0) {
            return invalid("min_note_ms must not be negative".into());
        }
        if self.render.sound.trim().is_empty() {
            return invalid("render.sound must not be empty".into());
        }

        crate::error::check_sensitivity(a.sensitivity)?;
        crate::error::check_tempo(self.render.default_tempo)?;
        self.time_signature()?;
        Ok(())
    }

    pub fn time_signature(&self) -> crate::Result<TimeSignature> {
        self.render.time_signature.parse()
    }
}

/// Bridge from the user-facing config to the DSP parameters.
impl TryFrom<&AnalysisConfig> for PitchConfig {
    type Error = Error;

    fn try_from(cfg: &AnalysisConfig) -> crate::Result<Self> {
        let estimator = PitchEstimator {
            min_freq_hz: cfg.pitch_floor_hz,
            max_freq_hz: cfg.pitch_ceiling_hz,
            ..PitchEstimator::default()
        }
        .with_sensitivity(cfg.sensitivity)?;

        Ok(PitchConfig {
            estimator,
            frame_size_ms: cfg.frame_size_ms,
            hop_size_ms: cfg.hop_size_ms,
        })
    }
}

/// Load the config from the platform config dir, or defaults if there is none.
pub fn load_config() -> Result<AppConfig> {
    let path = paths::config_file();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

/// Load and validate a specific config file.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}
