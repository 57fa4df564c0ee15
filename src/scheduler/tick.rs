use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which host update loop produced a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickStep {
    /// Per-rendered-frame update with a varying delta
    #[default]
    Variable,
    /// Fixed-timestep update
    Fixed,
}

/// One host tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous tick of the same step kind
    pub delta_seconds: f32,
    /// Update loop this tick belongs to
    pub step: TickStep,
    /// Global time-scale multiplier (1.0 = real time)
    pub time_scale: f32,
}

impl FrameTick {
    /// Variable-step tick at normal time scale.
    pub fn variable(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            step: TickStep::Variable,
            time_scale: 1.0,
        }
    }

    /// Fixed-step tick at normal time scale.
    pub fn fixed(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            step: TickStep::Fixed,
            time_scale: 1.0,
        }
    }

    /// Set the time-scale multiplier.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}

/// Cooperative cancellation flag shared between a caller and a session.
///
/// The scheduler checks the flag at the start of each tick. A cancelled
/// session is dropped without writing to its device; silencing the motors
/// is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a single [`Scheduler::tick`](super::Scheduler::tick) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Commands accepted by devices
    pub written: usize,
    /// Sessions that reached the end of a non-looping clip
    pub completed: usize,
    /// Sessions dropped because their token was cancelled
    pub cancelled: usize,
    /// Device writes that failed
    pub failed: usize,
}

impl TickReport {
    /// Whether nothing happened this tick.
    pub fn is_idle(&self) -> bool {
        *self == TickReport::default()
    }
}
