//! Two-motor crossfade
//!
//! Rumble gamepads have a heavy low-frequency motor and a light
//! high-frequency motor. The crossfade distributes a breakpoint's amplitude
//! between the two according to its normalized frequency.

mod curve;

pub use curve::{CurveKey, ResponseCurve};

use serde::{Deserialize, Serialize};

/// How amplitude is split between the low and high frequency motors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossfadeMode {
    /// `low + high = amplitude`; perceived intensity dips near a 50/50 blend.
    Linear,
    /// `low² + high² = amplitude²`; keeps perceived intensity constant.
    #[default]
    EqualPower,
    /// User-supplied response curve evaluated at `1 - frequency` and `frequency`.
    Curve(ResponseCurve),
}

impl CrossfadeMode {
    /// Map `(amplitude, frequency)` to `(low, high)` channel intensities.
    ///
    /// Both inputs are clamped to `[0, 1]`.
    #[inline]
    pub fn map(&self, amplitude: f32, frequency: f32) -> (f32, f32) {
        let amplitude = amplitude.clamp(0.0, 1.0);
        let high = frequency.clamp(0.0, 1.0);
        let low = 1.0 - high;
        match self {
            CrossfadeMode::Linear => (amplitude * low, amplitude * high),
            CrossfadeMode::EqualPower => (amplitude * low.sqrt(), amplitude * high.sqrt()),
            CrossfadeMode::Curve(curve) => {
                (amplitude * curve.evaluate(low), amplitude * curve.evaluate(high))
            }
        }
    }

    /// Parse a mode name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linear" => Some(CrossfadeMode::Linear),
            "equal-power" | "equalpower" | "equal_power" => Some(CrossfadeMode::EqualPower),
            _ => None,
        }
    }
}
