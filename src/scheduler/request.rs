use std::sync::Arc;

use bitflags::bitflags;

use super::tick::CancelToken;
use crate::actuator::DeviceHandle;
use crate::clip::HapticClip;

bitflags! {
    /// Playback behaviour switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlaybackFlags: u8 {
        /// Restart from the beginning at the end of the clip
        const LOOP = 0x01;
        /// Advance on fixed-step ticks instead of variable-step ticks
        const FIXED_STEP = 0x02;
        /// Scale elapsed time and intensity by the tick's time scale
        const APPLY_TIME_SCALE = 0x04;
        /// Use the baked keyframe table even on continuous actuators
        const FORCE_KEYFRAMED = 0x08;
    }
}

impl Default for PlaybackFlags {
    fn default() -> Self {
        PlaybackFlags::empty()
    }
}

/// Per-session playback options.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Behaviour switches
    pub flags: PlaybackFlags,
    /// External cancellation signal
    pub cancel: Option<CancelToken>,
    /// Host time scale in effect when playback starts. Only used with
    /// [`PlaybackFlags::APPLY_TIME_SCALE`], for the first command before
    /// any tick has reported a scale.
    pub time_scale: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            flags: PlaybackFlags::default(),
            cancel: None,
            time_scale: 1.0,
        }
    }
}

impl PlayOptions {
    /// Toggle looping.
    pub fn looping(mut self, enabled: bool) -> Self {
        self.flags.set(PlaybackFlags::LOOP, enabled);
        self
    }

    /// Toggle fixed-step advancement.
    pub fn fixed_step(mut self, enabled: bool) -> Self {
        self.flags.set(PlaybackFlags::FIXED_STEP, enabled);
        self
    }

    /// Toggle time-scale application.
    pub fn apply_time_scale(mut self, enabled: bool) -> Self {
        self.flags.set(PlaybackFlags::APPLY_TIME_SCALE, enabled);
        self
    }

    /// Toggle keyframed playback on continuous actuators.
    pub fn force_keyframed(mut self, enabled: bool) -> Self {
        self.flags.set(PlaybackFlags::FORCE_KEYFRAMED, enabled);
        self
    }

    /// Set the time scale used for the first command.
    pub fn time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Attach a cancellation token.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether the session loops.
    pub fn is_looping(&self) -> bool {
        self.flags.contains(PlaybackFlags::LOOP)
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    /// Clip to play
    pub clip: Arc<HapticClip>,
    /// Target device
    pub device: DeviceHandle,
    /// Playback options
    pub options: PlayOptions,
}

impl PlayRequest {
    /// Play `clip` once on `device` with default options.
    pub fn new(clip: Arc<HapticClip>, device: DeviceHandle) -> Self {
        Self {
            clip,
            device,
            options: PlayOptions::default(),
        }
    }

    /// Toggle looping.
    pub fn looping(mut self, enabled: bool) -> Self {
        self.options = self.options.looping(enabled);
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: PlayOptions) -> Self {
        self.options = options;
        self
    }
}
