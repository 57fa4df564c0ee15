//! Continuous time → value lookup over a breakpoint envelope.
//!
//! The sampler runs every playback tick, so it keeps a cursor to the segment
//! found by the previous call. Under monotonically increasing query times the
//! search only ever walks forward, which makes each lookup amortized O(1).

use super::{Breakpoint, Envelope};

/// Segments shorter than this are treated as vertical steps.
const SEGMENT_EPSILON: f32 = 1e-6;

/// Stateful envelope reader with a cached segment cursor.
///
/// One sampler should be used per envelope per playback; sharing a sampler
/// between envelopes only costs extra cursor resets.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeSampler {
    cursor: usize,
    last_time: f32,
}

impl EnvelopeSampler {
    /// Create a sampler positioned at the start of an envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewind the cursor to the first segment.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.last_time = 0.0;
    }

    /// Index of the breakpoint that starts the current segment.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sample `envelope` at `time` seconds.
    ///
    /// With `looping` set, the envelope is periodic with period
    /// `envelope.duration()`. Times past the end wrap around, and the wrap
    /// segment runs from the last breakpoint to the first breakpoint of the
    /// next cycle. Without looping, times outside the envelope clamp to the
    /// first or last value.
    pub fn sample_at<B: Breakpoint>(
        &mut self,
        envelope: &Envelope<B>,
        time: f32,
        looping: bool,
    ) -> f32 {
        let points = envelope.points();
        let first = envelope.first();
        let last = envelope.last();
        let duration = envelope.duration();

        let mut t = if time.is_nan() { 0.0 } else { time.max(0.0) };

        if looping && duration > 0.0 && t >= duration {
            t = t.rem_euclid(duration);
            // Stale indices from the previous cycle would skip the start.
            self.cursor = 0;
        }
        if t < self.last_time {
            self.cursor = 0;
        }
        self.last_time = t;

        if t < first.time() {
            if looping && duration > 0.0 {
                // Wrap segment [last, first + duration] shifted back one period.
                return segment_value(0.0, last.value(), first.time(), first.value(), t);
            }
            return first.value();
        }

        let count = points.len();
        if self.cursor >= count {
            self.cursor = 0;
        }
        while self.cursor + 1 < count && points[self.cursor + 1].time() <= t {
            self.cursor += 1;
        }

        let index = self.cursor;
        if index + 1 >= count {
            return last.value();
        }

        let (p0, p1) = (&points[index], &points[index + 1]);
        segment_value(p0.time(), p0.value(), p1.time(), p1.value(), t)
    }
}

/// Stateless, non-looping lookup.
///
/// Convenient for one-off queries; per-tick playback should keep an
/// [`EnvelopeSampler`] instead.
pub fn sample_envelope<B: Breakpoint>(envelope: &Envelope<B>, time: f32) -> f32 {
    EnvelopeSampler::new().sample_at(envelope, time, false)
}

fn segment_value(t0: f32, v0: f32, t1: f32, v1: f32, t: f32) -> f32 {
    let span = t1 - t0;
    if span <= SEGMENT_EPSILON {
        return v1;
    }
    let x = ((t - t0) / span).clamp(0.0, 1.0);
    v0 + (v1 - v0) * x
}
