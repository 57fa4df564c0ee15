//! Haptic rumble rendering engine
//!
//! Turns authored haptic clips (amplitude and frequency envelopes with
//! optional emphasis accents) into dual-channel intensity commands for
//! rumble-style vibration motors such as gamepad actuators.
//!
//! # Features
//! - Piecewise-linear envelope sampling with loop wraparound
//! - Emphasis rendering (ducking and accent pulses for actuators without transients)
//! - Fixed-rate keyframe baking for bandwidth-constrained wireless actuators
//! - Linear, equal-power and custom-curve crossfade between the two motors
//! - Tick-driven playback scheduler with at most one live session per device
//!
//! # Crate feature flags
//! - `json` (default): `.haptic` JSON clip loading (`clip::load_bytes`, `clip::load_file`)
//! - `csv-export` (default): CSV export of baked keyframe tables
//!
//! # Quick start
//! ```no_run
//! # #[cfg(feature = "json")]
//! # {
//! use std::sync::Arc;
//! use haptic_rumble::actuator::{DeviceHandle, DeviceId, RecordingActuator};
//! use haptic_rumble::scheduler::{FrameTick, PlayRequest, Scheduler};
//! use haptic_rumble::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let clip = haptic_rumble::clip::load_file("kick.haptic")
//!     .unwrap()
//!     .prepare(&config)
//!     .unwrap();
//! let device = DeviceHandle::new(DeviceId(0), Arc::new(RecordingActuator::default()));
//!
//! let scheduler = Scheduler::new(config);
//! let session = scheduler.play(PlayRequest::new(Arc::new(clip), device)).unwrap();
//! while scheduler.is_valid(session) {
//!     scheduler.tick(FrameTick::variable(1.0 / 60.0));
//! }
//! # }
//! ```

#![warn(missing_docs)]

pub mod actuator; // Actuator capability interface
pub mod clip; // Immutable clip data + loaders
pub mod config; // Engine configuration
pub mod crossfade; // Two-motor intensity mapping
pub mod emphasis; // Emphasis rendering
pub mod envelope; // Breakpoint model + sampler
pub mod keyframe; // Fixed-rate baking
pub mod scheduler; // Per-device playback

use actuator::ActuatorError;
use scheduler::SessionId;

/// Error types for haptic rendering and playback
#[derive(thiserror::Error, Debug)]
pub enum RumbleError {
    /// Empty or malformed breakpoint data
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Missing or disconnected actuator
    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    /// Operation against a superseded or stopped session
    #[error("Stale session: {0}")]
    StaleSession(SessionId),

    /// Error reported by the actuator while writing a command
    #[error("Device write failed: {0}")]
    DeviceWrite(#[from] ActuatorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for RumbleError {
    /// Converts a String into `RumbleError::Other`.
    ///
    /// Prefer the specific variants (`InvalidEnvelope`, `ConfigError`, ...)
    /// where the failure has a known category.
    fn from(msg: String) -> Self {
        RumbleError::Other(msg)
    }
}

impl From<&str> for RumbleError {
    fn from(msg: &str) -> Self {
        RumbleError::Other(msg.to_string())
    }
}

/// Result type for rendering and playback operations
pub type Result<T> = std::result::Result<T, RumbleError>;

// Public API exports
pub use actuator::{Actuator, ActuatorIdentity, DeviceHandle, DeviceId, Transport};
pub use clip::HapticClip;
pub use config::EngineConfig;
pub use crossfade::{CrossfadeMode, ResponseCurve};
pub use emphasis::render as render_emphasis;
pub use envelope::{
    AmplitudeBreakpoint, Breakpoint, Emphasis, EmphasisParameters, Envelope, EnvelopeSampler,
    FrequencyBreakpoint,
};
pub use keyframe::{bake, Keyframe, KeyframeTable, RumbleCommand};
pub use scheduler::{FrameTick, PlayOptions, PlayRequest, Scheduler, Session, TickStep};
