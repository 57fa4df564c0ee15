//! Actuator capability interface
//!
//! This module defines the interface every rumble device implements, whether
//! it is a wired gamepad with analog motors driven every frame or a wireless
//! controller that accepts a limited stream of timed commands.

mod recording;

pub use recording::{RecordedCommand, RecordingActuator};

use std::fmt;
use std::sync::Arc;

use crate::keyframe::{DEFAULT_COMMAND_DURATION_MS, DEFAULT_FRAME_RATE};

/// Failure reported by an actuator while handling a command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// Device is no longer reachable
    #[error("device disconnected")]
    Disconnected,

    /// Transport rejected or dropped the command
    #[error("transport error: {0}")]
    Transport(String),
}

/// Hardware identity of an actuator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActuatorIdentity {
    /// USB vendor id
    pub vendor_id: u16,
    /// USB product id
    pub product_id: u16,
    /// Human-readable product name
    pub name: String,
}

impl ActuatorIdentity {
    /// Create an identity.
    pub fn new(vendor_id: u16, product_id: u16, name: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            name: name.into(),
        }
    }

    /// Lookup key of the form `"045e:02ea"`.
    pub fn vid_pid_key(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

impl fmt::Display for ActuatorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.vid_pid_key())
    }
}

/// How commands reach the motors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transport {
    /// Analog motors updated every host tick.
    Continuous,
    /// Bandwidth-limited link fed from a baked keyframe table.
    Keyframed {
        /// Rate the device can absorb commands at (Hz)
        frame_rate: f32,
        /// How long each command holds the motors
        command_duration_ms: u32,
    },
}

impl Transport {
    /// Reference wireless transport: 25 Hz, 40 ms commands.
    pub const WIRELESS: Transport = Transport::Keyframed {
        frame_rate: DEFAULT_FRAME_RATE,
        command_duration_ms: DEFAULT_COMMAND_DURATION_MS,
    };

    /// Whether playback should use a baked keyframe table.
    pub fn is_keyframed(&self) -> bool {
        matches!(self, Transport::Keyframed { .. })
    }
}

/// Common interface for rumble actuators
///
/// Implementations must be usable from whichever thread drives
/// [`Scheduler::tick`](crate::scheduler::Scheduler::tick).
pub trait Actuator: Send + Sync {
    /// Hardware identity used for per-device tuning lookups.
    fn identity(&self) -> ActuatorIdentity;

    /// How commands reach this device.
    fn transport(&self) -> Transport;

    /// Whether the device is currently reachable.
    fn is_connected(&self) -> bool;

    /// Drive the low and high frequency motors.
    ///
    /// # Arguments
    ///
    /// * `low` - Low-frequency motor intensity (0.0 - 1.0)
    /// * `high` - High-frequency motor intensity (0.0 - 1.0)
    fn set_channels(&self, low: f32, high: f32) -> Result<(), ActuatorError>;
}

/// Host-assigned device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// A device id bound to its actuator.
#[derive(Clone)]
pub struct DeviceHandle {
    /// Identifier used for occupancy tracking
    pub id: DeviceId,
    /// Actuator receiving the commands
    pub actuator: Arc<dyn Actuator>,
}

impl DeviceHandle {
    /// Bind `actuator` to `id`.
    pub fn new(id: DeviceId, actuator: Arc<dyn Actuator>) -> Self {
        Self { id, actuator }
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("identity", &self.actuator.identity())
            .field("transport", &self.actuator.transport())
            .finish()
    }
}
