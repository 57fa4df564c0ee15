//! Per-device playback scheduler
//!
//! Each device is either Idle or Playing exactly one session. Starting a
//! new session on a busy device stops the old one first (zero intensity,
//! then invalidation), so two sessions never own the same device. A
//! session's validity is purely a matter of its id still being the one
//! recorded for its device.
//!
//! The host drives playback by calling [`Scheduler::tick`] once per update.
//! Each call advances every live session, evaluates its intensities and
//! writes them to the actuator while holding the device map lock; commands
//! for one device are therefore never torn or reordered.
//!
//! A session whose [`CancelToken`] fires goes dormant: it stops advancing
//! and writing, but keeps its device until [`Scheduler::stop`] (or a new
//! `play`) silences it.

mod request;
mod session;
mod tick;

pub use request::{PlayOptions, PlayRequest, PlaybackFlags};
pub use session::{Session, SessionId};
pub use tick::{CancelToken, FrameTick, TickReport, TickStep};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::actuator::{ActuatorError, DeviceId, Transport};
use crate::clip::HapticClip;
use crate::config::EngineConfig;
use crate::keyframe::{self, KeyframeTable};
use crate::{Result, RumbleError};
use session::{Advance, PlaybackSession, PlaybackSource};

/// Frame rates closer than this reuse a clip's pre-baked table.
const RATE_EPSILON: f32 = 1e-3;

/// Prepared copy of a clip that still carried emphasis tags.
struct RenderedClip {
    source: Weak<HapticClip>,
    prepared: Arc<HapticClip>,
}

/// Owns the device→session map and the session id counter.
pub struct Scheduler {
    config: EngineConfig,
    next_id: AtomicU64,
    sessions: Mutex<HashMap<DeviceId, PlaybackSession>>,
    // keyed by the source clip's allocation address
    rendered: Mutex<HashMap<usize, RenderedClip>>,
}

impl Scheduler {
    /// Create an idle scheduler.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            sessions: Mutex::new(HashMap::new()),
            rendered: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration used for crossfading and on-demand baking.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start playing a clip, superseding any live session on the device.
    ///
    /// The first command (elapsed time 0) is written before returning.
    /// Clips that still carry emphasis tags are prepared with this
    /// scheduler's configuration first; the prepared copy is cached for as
    /// long as the source clip is alive.
    ///
    /// # Errors
    /// - [`RumbleError::InvalidDevice`] if the actuator is disconnected
    /// - [`RumbleError::InvalidEnvelope`] / [`RumbleError::ConfigError`] if
    ///   emphasis rendering fails, or keyframed playback needs a table that
    ///   cannot be baked
    pub fn play(&self, request: PlayRequest) -> Result<Session> {
        let PlayRequest {
            clip,
            device,
            options,
        } = request;

        if !device.actuator.is_connected() {
            return Err(RumbleError::InvalidDevice(format!(
                "{} ({}) is not connected",
                device.id,
                device.actuator.identity()
            )));
        }

        let clip = self.playable_clip(clip)?;
        let source = match self.keyframe_rate(device.actuator.transport(), &options) {
            Some(rate) => PlaybackSource::keyframed(self.table_for(&clip, rate)?),
            None => PlaybackSource::continuous(self.config.crossfade.clone()),
        };

        let mut sessions = self.sessions.lock();
        if let Some(previous) = sessions.remove(&device.id) {
            debug!("{} superseded", previous.session());
            if let Err(e) = previous.silence() {
                warn!("failed to silence {}: {}", previous.session(), e);
            }
        }

        let session = Session {
            id: SessionId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            device: device.id,
        };
        let mut playback = PlaybackSession::new(session, clip, device, options, source);
        if let Err(e) = playback.write_current() {
            warn!("initial write for {} failed: {}", session, e);
        }
        info!(
            "started {} ({} mode)",
            session,
            if playback.is_keyframed() {
                "keyframed"
            } else {
                "continuous"
            }
        );
        sessions.insert(session.device, playback);
        Ok(session)
    }

    /// Advance every live session by one host tick.
    ///
    /// Device write failures are logged and counted; the session keeps
    /// playing. Completed sessions are removed. Cancelled sessions turn
    /// dormant and stay live until stopped or superseded.
    pub fn tick(&self, tick: FrameTick) -> TickReport {
        let mut report = TickReport::default();
        let mut sessions = self.sessions.lock();

        sessions.retain(|_, playback| match playback.advance(&tick) {
            Advance::Skipped | Advance::Held => true,
            Advance::Wrote(result) => {
                record_write(&mut report, playback.session(), result);
                true
            }
            Advance::Completed(result) => {
                record_write(&mut report, playback.session(), result);
                report.completed += 1;
                debug!("{} completed", playback.session());
                false
            }
            Advance::Cancelled => {
                report.cancelled += 1;
                debug!("{} cancelled, waiting for stop", playback.session());
                true
            }
        });

        report
    }

    /// Stop a session with zero intensity.
    ///
    /// Returns `false` without touching the device if the session is stale.
    pub fn stop(&self, session: Session) -> bool {
        let mut sessions = self.sessions.lock();
        let live = sessions
            .get(&session.device)
            .is_some_and(|playback| playback.session().id == session.id);
        if !live {
            debug!("ignoring stop for stale {}", session);
            return false;
        }
        sessions.remove(&session.device).map(stop_playback).is_some()
    }

    /// Stop whatever is playing on `device`.
    pub fn stop_device(&self, device: DeviceId) -> bool {
        self.sessions
            .lock()
            .remove(&device)
            .map(stop_playback)
            .is_some()
    }

    /// Stop every live session. Returns how many were stopped.
    pub fn stop_all(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let count = sessions.len();
        sessions.drain().for_each(|(_, playback)| stop_playback(playback));
        count
    }

    /// Whether `device` has a live session.
    pub fn is_busy(&self, device: DeviceId) -> bool {
        self.sessions.lock().contains_key(&device)
    }

    /// Whether `session` is still the live session of its device.
    pub fn is_valid(&self, session: Session) -> bool {
        self.live_session(session.device) == Some(session)
    }

    /// Live session on `device`, if any.
    pub fn live_session(&self, device: DeviceId) -> Option<Session> {
        self.sessions.lock().get(&device).map(PlaybackSession::session)
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Playback position of a live session in seconds.
    ///
    /// # Errors
    /// [`RumbleError::StaleSession`] if the session was stopped or superseded.
    pub fn position(&self, session: Session) -> Result<f32> {
        self.sessions
            .lock()
            .get(&session.device)
            .filter(|playback| playback.session().id == session.id)
            .map(PlaybackSession::elapsed)
            .ok_or(RumbleError::StaleSession(session.id))
    }

    fn keyframe_rate(&self, transport: Transport, options: &PlayOptions) -> Option<f32> {
        match transport {
            Transport::Keyframed { frame_rate, .. } => Some(frame_rate),
            Transport::Continuous if options.flags.contains(PlaybackFlags::FORCE_KEYFRAMED) => {
                Some(self.config.keyframe_rate)
            }
            Transport::Continuous => None,
        }
    }

    fn playable_clip(&self, clip: Arc<HapticClip>) -> Result<Arc<HapticClip>> {
        if clip.amplitude().emphasis_count() == 0 {
            return Ok(clip);
        }
        let key = Arc::as_ptr(&clip) as usize;
        let mut rendered = self.rendered.lock();
        rendered.retain(|_, entry| entry.source.strong_count() > 0);
        if let Some(entry) = rendered.get(&key) {
            return Ok(Arc::clone(&entry.prepared));
        }

        debug!(
            "rendering {} emphasis accents before playback",
            clip.amplitude().emphasis_count()
        );
        let prepared = Arc::new(clip.as_ref().clone().prepare(&self.config)?);
        rendered.insert(
            key,
            RenderedClip {
                source: Arc::downgrade(&clip),
                prepared: Arc::clone(&prepared),
            },
        );
        Ok(prepared)
    }

    fn table_for(&self, clip: &HapticClip, frame_rate: f32) -> Result<Arc<KeyframeTable>> {
        if let Some(table) = clip
            .keyframes()
            .filter(|table| (table.frame_rate() - frame_rate).abs() < RATE_EPSILON)
        {
            return Ok(Arc::clone(table));
        }
        debug!("baking keyframes on demand at {} Hz", frame_rate);
        keyframe::bake(
            clip.amplitude(),
            clip.frequency(),
            frame_rate,
            &self.config.crossfade,
        )
        .map(Arc::new)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn record_write(
    report: &mut TickReport,
    session: Session,
    result: std::result::Result<(), ActuatorError>,
) {
    match result {
        Ok(()) => report.written += 1,
        Err(e) => {
            report.failed += 1;
            warn!("write for {} failed: {}", session, e);
        }
    }
}

fn stop_playback(playback: PlaybackSession) {
    if let Err(e) = playback.silence() {
        warn!("failed to silence {}: {}", playback.session(), e);
    }
    if playback.is_dormant() {
        debug!("{} stopped after cancellation", playback.session());
    } else {
        debug!("{} stopped", playback.session());
    }
}
