//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::crossfade::CrossfadeMode;
use crate::envelope::EmphasisParameters;
use crate::keyframe::{DEFAULT_COMMAND_DURATION_MS, DEFAULT_FRAME_RATE};
use crate::{Result, RumbleError};

/// Settings shared by clip preparation and playback.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How amplitude is split between the two motors
    pub crossfade: CrossfadeMode,
    /// Rate keyframe tables are baked at (Hz)
    pub keyframe_rate: f32,
    /// Hold time of each wireless command
    pub command_duration_ms: u32,
    /// Ducking and accent shaping applied to emphasis breakpoints
    pub emphasis: EmphasisParameters,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crossfade: CrossfadeMode::EqualPower,
            keyframe_rate: DEFAULT_FRAME_RATE,
            command_duration_ms: DEFAULT_COMMAND_DURATION_MS,
            emphasis: EmphasisParameters::default(),
        }
    }
}

impl EngineConfig {
    /// Set the crossfade mode.
    pub fn crossfade(mut self, mode: CrossfadeMode) -> Self {
        self.crossfade = mode;
        self
    }

    /// Set the keyframe bake rate.
    pub fn keyframe_rate(mut self, hz: f32) -> Self {
        self.keyframe_rate = hz;
        self
    }

    /// Set the wireless command hold time.
    pub fn command_duration_ms(mut self, ms: u32) -> Self {
        self.command_duration_ms = ms;
        self
    }

    /// Set the emphasis shaping parameters.
    pub fn emphasis(mut self, params: EmphasisParameters) -> Self {
        self.emphasis = params;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.keyframe_rate.is_finite() || self.keyframe_rate <= 0.0 {
            return Err(RumbleError::ConfigError(format!(
                "keyframe_rate must be positive, got {}",
                self.keyframe_rate
            )));
        }
        self.emphasis.validate().map_err(|e| match e {
            RumbleError::InvalidEnvelope(msg) => RumbleError::ConfigError(msg),
            other => other,
        })
    }

    /// Parse and validate a JSON configuration document.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| RumbleError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
