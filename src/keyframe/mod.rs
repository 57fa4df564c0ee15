//! Fixed-rate keyframe tables
//!
//! Wireless actuators saturate their command buffer when fed one command per
//! host frame. Baking quantizes a clip to a low fixed rate (25 Hz by default)
//! once, at import time; playback then only re-sends a command when the
//! quantized frame index changes.

mod baker;
#[cfg(feature = "csv-export")]
pub mod export;

pub use baker::{bake, frame_count_for};

use serde::{Deserialize, Serialize};

/// Reference bake rate for wireless gamepads.
pub const DEFAULT_FRAME_RATE: f32 = 25.0;

/// Reference command duration: one frame interval at [`DEFAULT_FRAME_RATE`].
pub const DEFAULT_COMMAND_DURATION_MS: u32 = 40;

/// Channel intensities of one baked frame, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
    /// Low-frequency motor intensity
    pub low: f32,
    /// High-frequency motor intensity
    pub high: f32,
}

impl Keyframe {
    /// Create a keyframe.
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

/// Keyframes sampled at a fixed rate over a clip's duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTable {
    frames: Vec<Keyframe>,
    frame_rate: f32,
    duration: f32,
}

impl KeyframeTable {
    pub(crate) fn from_parts(frames: Vec<Keyframe>, frame_rate: f32, duration: f32) -> Self {
        Self {
            frames,
            frame_rate,
            duration,
        }
    }

    /// All frames in playback order.
    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Duration of the source clip in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Number of frames (`ceil(duration × frame_rate)`).
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether the table holds no frames (zero-length clip).
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, if within the table.
    pub fn frame_at(&self, index: usize) -> Option<Keyframe> {
        self.frames.get(index).copied()
    }

    /// Quantized frame index for an elapsed playback time.
    pub fn frame_index_at(&self, elapsed: f32) -> usize {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        (elapsed * self.frame_rate).floor() as usize
    }

    /// Length of one frame in milliseconds, rounded.
    pub fn frame_interval_ms(&self) -> u32 {
        (1000.0 / self.frame_rate).round() as u32
    }

    /// Convert every frame into a wireless rumble command.
    pub fn rumble_commands(&self, duration_ms: u32) -> Vec<RumbleCommand> {
        self.frames
            .iter()
            .map(|frame| RumbleCommand::from_keyframe(*frame, duration_ms))
            .collect()
    }
}

/// Motor command in the 16-bit form used by wireless rumble protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RumbleCommand {
    /// Low-frequency motor intensity (0 - 65535)
    pub low: u16,
    /// High-frequency motor intensity (0 - 65535)
    pub high: u16,
    /// How long the actuator should hold this command
    pub duration_ms: u32,
}

impl RumbleCommand {
    /// Immediate all-off command. A zero duration must not schedule a
    /// delayed stop behind already queued packets.
    pub const STOP: RumbleCommand = RumbleCommand {
        low: 0,
        high: 0,
        duration_ms: 0,
    };

    /// Quantize channel intensities to 16 bits (truncating).
    pub fn from_channels(low: f32, high: f32, duration_ms: u32) -> Self {
        Self {
            low: to_u16(low),
            high: to_u16(high),
            duration_ms,
        }
    }

    /// Quantize a baked keyframe.
    pub fn from_keyframe(frame: Keyframe, duration_ms: u32) -> Self {
        Self::from_channels(frame.low, frame.high, duration_ms)
    }
}

#[inline]
fn to_u16(intensity: f32) -> u16 {
    (intensity.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_is_floor_of_elapsed_times_rate() {
        let table = KeyframeTable::from_parts(vec![Keyframe::default(); 50], 25.0, 2.0);
        assert_eq!(table.frame_index_at(0.0), 0);
        assert_eq!(table.frame_index_at(0.039), 0);
        assert_eq!(table.frame_index_at(0.041), 1);
        assert_eq!(table.frame_index_at(1.99), 49);
        assert_eq!(table.frame_index_at(-1.0), 0);
        assert_eq!(table.frame_interval_ms(), 40);
    }

    #[test]
    fn rumble_command_quantization() {
        let cmd = RumbleCommand::from_channels(1.0, 0.5, 40);
        assert_eq!(cmd.low, u16::MAX);
        assert_eq!(cmd.high, 32767);
        assert_eq!(cmd.duration_ms, 40);

        let clamped = RumbleCommand::from_channels(2.0, -1.0, 40);
        assert_eq!(clamped.low, u16::MAX);
        assert_eq!(clamped.high, 0);
    }

    #[test]
    fn table_converts_to_commands() {
        let table = KeyframeTable::from_parts(
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 0.0)],
            25.0,
            0.08,
        );
        let commands = table.rumble_commands(DEFAULT_COMMAND_DURATION_MS);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].low, u16::MAX);
        assert_eq!(RumbleCommand::STOP.duration_ms, 0);
    }
}
