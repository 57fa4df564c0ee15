use std::fmt;
use std::sync::Arc;

use super::request::{PlayOptions, PlaybackFlags};
use super::tick::{FrameTick, TickStep};
use crate::actuator::{ActuatorError, DeviceHandle, DeviceId};
use crate::clip::HapticClip;
use crate::crossfade::CrossfadeMode;
use crate::envelope::EnvelopeSampler;
use crate::keyframe::KeyframeTable;

/// Monotonically increasing session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Handle to a playback session: the id plus the device it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Session {
    /// Session id
    pub id: SessionId,
    /// Occupied device
    pub device: DeviceId,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.id, self.device)
    }
}

/// Frequency used when a clip has no frequency envelope.
const NEUTRAL_FREQUENCY: f32 = 0.5;

/// Source of intensities for a session.
#[derive(Debug)]
pub(crate) enum PlaybackSource {
    /// Sample and crossfade every tick.
    Continuous {
        crossfade: CrossfadeMode,
        amplitude: EnvelopeSampler,
        frequency: EnvelopeSampler,
    },
    /// Read baked frames, writing only when the frame index or the
    /// applied intensity scale changes.
    Keyframed {
        table: Arc<KeyframeTable>,
        last_frame: Option<usize>,
        last_scale: f32,
    },
}

impl PlaybackSource {
    pub(crate) fn continuous(crossfade: CrossfadeMode) -> Self {
        PlaybackSource::Continuous {
            crossfade,
            amplitude: EnvelopeSampler::new(),
            frequency: EnvelopeSampler::new(),
        }
    }

    pub(crate) fn keyframed(table: Arc<KeyframeTable>) -> Self {
        PlaybackSource::Keyframed {
            table,
            last_frame: None,
            last_scale: 1.0,
        }
    }
}

/// Result of advancing a session by one tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Advance {
    /// Tick belongs to the other update loop.
    Skipped,
    /// Keyframe unchanged since the last write, or the session is dormant.
    Held,
    /// A command was sent.
    Wrote(Result<(), ActuatorError>),
    /// Non-looping clip finished; a zero command was sent.
    Completed(Result<(), ActuatorError>),
    /// Cancellation observed; nothing was written and the session is
    /// now dormant.
    Cancelled,
}

/// Live per-device playback state.
#[derive(Debug)]
pub(crate) struct PlaybackSession {
    session: Session,
    clip: Arc<HapticClip>,
    device: DeviceHandle,
    options: PlayOptions,
    source: PlaybackSource,
    elapsed: f32,
    scale: f32,
    dormant: bool,
}

impl PlaybackSession {
    pub(crate) fn new(
        session: Session,
        clip: Arc<HapticClip>,
        device: DeviceHandle,
        options: PlayOptions,
        source: PlaybackSource,
    ) -> Self {
        let scale = if options.flags.contains(PlaybackFlags::APPLY_TIME_SCALE) {
            finite_non_negative(options.time_scale)
        } else {
            1.0
        };
        Self {
            session,
            clip,
            device,
            options,
            source,
            elapsed: 0.0,
            scale,
            dormant: false,
        }
    }

    pub(crate) fn session(&self) -> Session {
        self.session
    }

    pub(crate) fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn is_keyframed(&self) -> bool {
        matches!(self.source, PlaybackSource::Keyframed { .. })
    }

    /// Whether cancellation was observed. A dormant session neither
    /// advances nor writes but still owns its device until stopped.
    pub(crate) fn is_dormant(&self) -> bool {
        self.dormant
    }

    /// Write the intensities at the current position, ignoring the frame
    /// suppression. Used for the first command of a session.
    pub(crate) fn write_current(&mut self) -> Result<(), ActuatorError> {
        let (low, high) = self.current_channels(self.scale).1;
        self.device.actuator.set_channels(low, high)
    }

    /// Command zero intensity.
    pub(crate) fn silence(&self) -> Result<(), ActuatorError> {
        self.device.actuator.set_channels(0.0, 0.0)
    }

    pub(crate) fn advance(&mut self, tick: &FrameTick) -> Advance {
        if self.dormant {
            return Advance::Held;
        }
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            self.dormant = true;
            return Advance::Cancelled;
        }

        let wants_fixed = self.options.flags.contains(PlaybackFlags::FIXED_STEP);
        if wants_fixed != (tick.step == TickStep::Fixed) {
            return Advance::Skipped;
        }

        if self.options.flags.contains(PlaybackFlags::APPLY_TIME_SCALE) {
            self.scale = finite_non_negative(tick.time_scale);
        }
        self.elapsed += finite_non_negative(tick.delta_seconds) * self.scale;

        let duration = self.clip.duration();
        if self.elapsed > duration {
            if self.options.is_looping() && duration > 0.0 {
                // Carry the overshoot into the next cycle.
                self.elapsed = self.elapsed.rem_euclid(duration);
            } else {
                self.elapsed = duration;
                return Advance::Completed(self.silence());
            }
        }

        match self.current_channels(self.scale) {
            (false, _) => Advance::Held,
            (true, (low, high)) => Advance::Wrote(self.device.actuator.set_channels(low, high)),
        }
    }

    /// Channel intensities at `elapsed`, and whether they should be sent.
    fn current_channels(&mut self, intensity_scale: f32) -> (bool, (f32, f32)) {
        let looping = self.options.is_looping();
        let t = self.elapsed;
        let (changed, (low, high)) = match &mut self.source {
            PlaybackSource::Continuous {
                crossfade,
                amplitude,
                frequency,
            } => {
                let a = amplitude.sample_at(self.clip.amplitude(), t, looping);
                let f = self.clip.frequency().map_or(NEUTRAL_FREQUENCY, |env| {
                    frequency.sample_at(env, t, looping)
                });
                (true, crossfade.map(a, f))
            }
            PlaybackSource::Keyframed {
                table,
                last_frame,
                last_scale,
            } => {
                let index = table
                    .frame_index_at(t)
                    .min(table.frame_count().saturating_sub(1));
                // Empty tables (zero-length clips) play as silence.
                let frame = table.frame_at(index).unwrap_or_default();
                let changed = *last_frame != Some(index) || *last_scale != intensity_scale;
                *last_frame = Some(index);
                *last_scale = intensity_scale;
                (changed, (frame.low, frame.high))
            }
        };
        (
            changed,
            (
                (low * intensity_scale).clamp(0.0, 1.0),
                (high * intensity_scale).clamp(0.0, 1.0),
            ),
        )
    }
}

#[inline]
fn finite_non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
