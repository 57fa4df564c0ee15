//! Breakpoint envelope model
//!
//! An envelope is an ordered list of `(time, value)` breakpoints describing a
//! piecewise-linear signal. Clips carry one amplitude envelope (whose
//! breakpoints may be tagged with an emphasis accent) and one frequency
//! envelope. Envelopes are validated once at construction and are read-only
//! afterwards.

mod sampler;

pub use sampler::{sample_envelope, EnvelopeSampler};

use serde::{Deserialize, Serialize};

use crate::{Result, RumbleError};

/// Common view over amplitude and frequency breakpoints.
pub trait Breakpoint: Clone {
    /// Position of this breakpoint in seconds.
    fn time(&self) -> f32;

    /// Scalar value at this breakpoint.
    fn value(&self) -> f32;
}

/// Peak values of a simulated transient accent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    /// Accent amplitude (0.0 - 1.0)
    pub amplitude: f32,
    /// Accent frequency (0.0 - 1.0)
    pub frequency: f32,
}

/// Breakpoint of an amplitude envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeBreakpoint {
    /// Time in seconds
    pub time: f32,
    /// Amplitude (0.0 - 1.0)
    pub amplitude: f32,
    /// Optional emphasis accent anchored at this breakpoint
    #[serde(default)]
    pub emphasis: Option<Emphasis>,
}

impl AmplitudeBreakpoint {
    /// Plain breakpoint without emphasis.
    pub fn new(time: f32, amplitude: f32) -> Self {
        Self {
            time,
            amplitude,
            emphasis: None,
        }
    }

    /// Breakpoint carrying an emphasis accent.
    pub fn emphasized(time: f32, amplitude: f32, emphasis: Emphasis) -> Self {
        Self {
            time,
            amplitude,
            emphasis: Some(emphasis),
        }
    }

    /// Whether this breakpoint is tagged with an emphasis accent.
    pub fn is_emphasized(&self) -> bool {
        self.emphasis.is_some()
    }
}

impl Breakpoint for AmplitudeBreakpoint {
    fn time(&self) -> f32 {
        self.time
    }

    fn value(&self) -> f32 {
        self.amplitude
    }
}

/// Breakpoint of a frequency envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBreakpoint {
    /// Time in seconds
    pub time: f32,
    /// Normalized frequency (0.0 = low motor, 1.0 = high motor)
    pub frequency: f32,
}

impl FrequencyBreakpoint {
    /// Create a frequency breakpoint.
    pub fn new(time: f32, frequency: f32) -> Self {
        Self { time, frequency }
    }
}

impl Breakpoint for FrequencyBreakpoint {
    fn time(&self) -> f32 {
        self.time
    }

    fn value(&self) -> f32 {
        self.frequency
    }
}

/// Non-empty, time-ordered sequence of breakpoints.
///
/// Invariants checked by [`Envelope::new`]:
/// - at least one breakpoint
/// - every time is finite and `>= 0`
/// - times never decrease
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<B> {
    points: Vec<B>,
}

impl<B: Breakpoint> Envelope<B> {
    /// Validate and wrap a list of breakpoints.
    ///
    /// # Errors
    /// Returns [`RumbleError::InvalidEnvelope`] if the list is empty, contains
    /// a negative or non-finite time or value, or is not sorted by time.
    pub fn new(points: Vec<B>) -> Result<Self> {
        if points.is_empty() {
            return Err(RumbleError::InvalidEnvelope(
                "envelope has no breakpoints".into(),
            ));
        }

        let mut prev_time = 0.0f32;
        for (index, point) in points.iter().enumerate() {
            let time = point.time();
            if !time.is_finite() || time < 0.0 {
                return Err(RumbleError::InvalidEnvelope(format!(
                    "breakpoint {index} has invalid time {time}"
                )));
            }
            if !point.value().is_finite() {
                return Err(RumbleError::InvalidEnvelope(format!(
                    "breakpoint {index} has non-finite value"
                )));
            }
            if time < prev_time {
                return Err(RumbleError::InvalidEnvelope(format!(
                    "breakpoint {index} at {time}s precedes previous breakpoint at {prev_time}s"
                )));
            }
            prev_time = time;
        }

        Ok(Self { points })
    }

    /// Breakpoints in time order.
    pub fn points(&self) -> &[B] {
        &self.points
    }

    /// Number of breakpoints (always >= 1).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First breakpoint.
    pub fn first(&self) -> &B {
        &self.points[0]
    }

    /// Last breakpoint.
    pub fn last(&self) -> &B {
        &self.points[self.points.len() - 1]
    }

    /// Time of the last breakpoint in seconds.
    pub fn duration(&self) -> f32 {
        self.last().time()
    }

    /// Consume the envelope and return the breakpoints.
    pub fn into_points(self) -> Vec<B> {
        self.points
    }
}

impl Envelope<AmplitudeBreakpoint> {
    /// Number of emphasis-tagged breakpoints.
    pub fn emphasis_count(&self) -> usize {
        self.points.iter().filter(|bp| bp.is_emphasized()).count()
    }
}

/// Clip-wide constants controlling how emphasis accents are rendered.
///
/// All durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmphasisParameters {
    /// Amplitude the continuous signal is lowered to around an accent
    pub ducking_amplitude: f32,
    /// Length of the full-amplitude accent pulse
    pub emphasis_length: f32,
    /// Ducking window before the accent
    pub ducking_before: f32,
    /// Ducking window after the accent pulse
    pub ducking_after: f32,
}

impl Default for EmphasisParameters {
    fn default() -> Self {
        Self {
            ducking_amplitude: 0.0,
            emphasis_length: 0.03,
            ducking_before: 0.03,
            ducking_after: 0.03,
        }
    }
}

impl EmphasisParameters {
    /// Check that every parameter is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("ducking_amplitude", self.ducking_amplitude),
            ("emphasis_length", self.emphasis_length),
            ("ducking_before", self.ducking_before),
            ("ducking_after", self.ducking_after),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RumbleError::InvalidEnvelope(format!(
                    "emphasis parameter {name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
