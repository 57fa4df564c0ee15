//! Emphasis rendering
//!
//! Rumble motors cannot play true transients, only a continuous amplitude.
//! Emphasis accents are therefore simulated by rewriting the amplitude
//! envelope around every emphasis-tagged breakpoint:
//!
//! ```text
//!            ducking   accent   ducking
//!            before    pulse    after
//! natural ──┐        ┌──────┐        ┌── natural
//!           └────────┘      └────────┘
//!                    te
//! ```
//!
//! Plain breakpoints inside a ducking window are dropped; the synthesized
//! points recover the original envelope's natural value at the window edges.
//! Overlapping windows are resolved by anchoring each accent at the last
//! emitted time, so the output never moves backwards in time.

use crate::envelope::{AmplitudeBreakpoint, EmphasisParameters, Envelope, EnvelopeSampler};
use crate::Result;

/// Accent spans at or below this length are treated as absent.
const SPAN_EPSILON: f32 = 1e-6;

/// Times closer than this are the same instant.
const TIME_EPSILON: f32 = 1e-6;

/// Amplitude of the simulated accent pulse.
const PULSE_AMPLITUDE: f32 = 1.0;

/// Expand emphasis-tagged breakpoints into plain ducking and accent breakpoints.
///
/// The returned envelope carries no emphasis tags. Its times never decrease;
/// a vertical step is two breakpoints sharing one instant. The input is left
/// untouched.
///
/// # Errors
/// Returns [`crate::RumbleError::InvalidEnvelope`] if `params` contains a
/// negative or non-finite value.
pub fn render(
    envelope: &Envelope<AmplitudeBreakpoint>,
    params: &EmphasisParameters,
) -> Result<Envelope<AmplitudeBreakpoint>> {
    params.validate()?;

    let points = envelope.points();
    let mut natural = EnvelopeSampler::new();
    let mut out = StepWriter::with_capacity(points.len() + envelope.emphasis_count() * 8);

    let mut prev_emphasis: Option<f32> = None;
    let mut next_emphasis = next_emphasis_time(points, 0);

    for (index, bp) in points.iter().enumerate() {
        if bp.emphasis.is_none() {
            let ducked_before = next_emphasis
                .is_some_and(|te| bp.time >= te - params.ducking_before && bp.time <= te);
            let ducked_after = prev_emphasis.is_some_and(|tp| {
                bp.time >= tp && bp.time <= tp + params.emphasis_length + params.ducking_after
            });
            if !ducked_before && !ducked_after {
                out.push(bp.time, bp.amplitude);
            }
            continue;
        }

        let is_last = index + 1 == points.len();
        render_accent(&mut out, envelope, &mut natural, bp.time, is_last, params);

        prev_emphasis = Some(bp.time);
        next_emphasis = next_emphasis_time(points, index + 1);
    }

    Envelope::new(out.finish())
}

fn next_emphasis_time(points: &[AmplitudeBreakpoint], from: usize) -> Option<f32> {
    points
        .iter()
        .skip(from)
        .find(|bp| bp.is_emphasized())
        .map(|bp| bp.time)
}

fn render_accent(
    out: &mut StepWriter,
    original: &Envelope<AmplitudeBreakpoint>,
    natural: &mut EnvelopeSampler,
    te: f32,
    is_last: bool,
    params: &EmphasisParameters,
) {
    let anchor = out.last_time().unwrap_or(0.0).max(0.0);
    let duck = params.ducking_amplitude;

    // Ducking before the accent.
    let start = anchor.max(te - params.ducking_before);
    if start > anchor {
        out.push(start, natural.sample_at(original, start, false));
    }
    out.push(start, duck);
    out.push(te, duck);

    // Accent pulse.
    let emphasis_start = anchor.max(te);
    let emphasis_end = emphasis_start + params.emphasis_length;
    if emphasis_end - emphasis_start <= SPAN_EPSILON {
        return;
    }
    out.push(emphasis_start, PULSE_AMPLITUDE);
    out.push(emphasis_end, PULSE_AMPLITUDE);
    if is_last {
        return;
    }

    // Ducking after the accent, then back onto the natural trajectory.
    let ducking_after_end = emphasis_end + params.ducking_after;
    out.push(emphasis_end, duck);
    out.push(ducking_after_end, duck);
    out.push(
        ducking_after_end,
        natural.sample_at(original, ducking_after_end, false),
    );
}

/// Output buffer that keeps the rendered envelope well formed.
///
/// - points earlier than the last emitted time are dropped
/// - a point identical to the previous one is skipped
/// - an instant holds at most two points (a step); a third replaces the
///   step's target value
struct StepWriter {
    points: Vec<AmplitudeBreakpoint>,
}

impl StepWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    fn last_time(&self) -> Option<f32> {
        self.points.last().map(|bp| bp.time)
    }

    fn push(&mut self, time: f32, amplitude: f32) {
        let count = self.points.len();
        let Some(last) = self.points.last().copied() else {
            self.points.push(AmplitudeBreakpoint::new(time, amplitude));
            return;
        };

        if time < last.time - TIME_EPSILON {
            return;
        }
        if time > last.time + TIME_EPSILON {
            self.points.push(AmplitudeBreakpoint::new(time, amplitude));
            return;
        }

        // Same instant as the last point.
        if amplitude == last.amplitude {
            return;
        }
        let is_step = count >= 2 && (self.points[count - 2].time - last.time).abs() <= TIME_EPSILON;
        if !is_step {
            self.points.push(AmplitudeBreakpoint::new(last.time, amplitude));
            return;
        }

        let step_origin = self.points[count - 2].amplitude;
        if amplitude == step_origin {
            self.points.pop();
        } else {
            self.points[count - 1].amplitude = amplitude;
        }
    }

    fn finish(self) -> Vec<AmplitudeBreakpoint> {
        self.points
    }
}
