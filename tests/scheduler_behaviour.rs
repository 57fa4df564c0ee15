use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use haptic_rumble::actuator::{DeviceHandle, DeviceId, RecordingActuator};
use haptic_rumble::scheduler::{
    CancelToken, FrameTick, PlayOptions, PlayRequest, Scheduler, TickReport,
};
use haptic_rumble::envelope::Emphasis;
use haptic_rumble::{EngineConfig, HapticClip};

fn one_second_ramp() -> Arc<HapticClip> {
    let clip = HapticClip::builder()
        .amplitude(0.0, 0.2)
        .amplitude(1.0, 0.8)
        .frequency(0.0, 0.5)
        .frequency(1.0, 0.5)
        .build()
        .unwrap()
        .prepare(&EngineConfig::default())
        .unwrap();
    Arc::new(clip)
}

fn continuous(id: u64) -> (DeviceHandle, Arc<RecordingActuator>) {
    let actuator = Arc::new(RecordingActuator::continuous());
    (DeviceHandle::new(DeviceId(id), actuator.clone()), actuator)
}

fn wireless(id: u64) -> (DeviceHandle, Arc<RecordingActuator>) {
    let actuator = Arc::new(RecordingActuator::wireless());
    (DeviceHandle::new(DeviceId(id), actuator.clone()), actuator)
}

fn run(scheduler: &Scheduler, ticks: usize, dt: f32) -> TickReport {
    let mut total = TickReport::default();
    for _ in 0..ticks {
        let report = scheduler.tick(FrameTick::variable(dt));
        total.written += report.written;
        total.completed += report.completed;
        total.cancelled += report.cancelled;
        total.failed += report.failed;
    }
    total
}

#[test]
fn second_play_invalidates_first_immediately() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);

    let first = scheduler
        .play(PlayRequest::new(one_second_ramp(), device.clone()))
        .unwrap();
    let second = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    assert!(!scheduler.is_valid(first));
    assert!(scheduler.is_valid(second));
    assert!(second.id > first.id);
    assert_eq!(scheduler.live_session(DeviceId(1)), Some(second));

    // initial write, zero on supersession, initial write
    let commands = actuator.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!((commands[1].low, commands[1].high), (0.0, 0.0));
}

#[test]
fn stale_stop_is_a_silent_no_op() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let first = scheduler
        .play(PlayRequest::new(one_second_ramp(), device.clone()))
        .unwrap();
    let second = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();
    let before = actuator.command_count();

    assert!(!scheduler.stop(first));
    assert!(scheduler.is_valid(second));
    assert_eq!(actuator.command_count(), before);
}

#[test]
fn continuous_mode_writes_every_tick() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    let report = run(&scheduler, 10, 0.02);
    assert_eq!(report.written, 10);
    assert_eq!(actuator.command_count(), 11);

    // amplitude at 0.2 s is 0.32, split evenly at frequency 0.5
    let last = actuator.last_command().unwrap();
    assert_abs_diff_eq!(last.low, 0.32 / 2f32.sqrt(), epsilon = 1e-4);
    assert_abs_diff_eq!(last.high, last.low, epsilon = 1e-6);
}

#[test]
fn keyframed_mode_writes_only_on_frame_change() {
    let scheduler = Scheduler::default();
    let (device, actuator) = wireless(1);
    scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    // 100 Hz host ticks over 0.5 s cross frames 1..=12 of a 25 Hz table.
    let report = run(&scheduler, 50, 0.01);
    assert_eq!(report.written, 12);
    assert_eq!(actuator.command_count(), 13);
}

#[test]
fn cancelled_session_waits_for_stop() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let token = CancelToken::new();
    let options = PlayOptions::default().cancel_token(token.clone());
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device).with_options(options))
        .unwrap();

    scheduler.tick(FrameTick::variable(0.02));
    let attempts = actuator.attempt_count();

    token.cancel();
    let report = scheduler.tick(FrameTick::variable(0.02));
    assert_eq!(report.cancelled, 1);
    assert_eq!(report.written, 0);
    assert_eq!(actuator.attempt_count(), attempts);

    // Dormant: still owns the device, never advances or writes again.
    let report = run(&scheduler, 5, 0.02);
    assert!(report.is_idle());
    assert_eq!(actuator.attempt_count(), attempts);
    assert!(scheduler.is_valid(session));
    assert!(scheduler.is_busy(DeviceId(1)));
    assert_abs_diff_eq!(scheduler.position(session).unwrap(), 0.02, epsilon = 1e-6);

    let last = actuator.last_command().unwrap();
    assert!(last.low > 0.0);

    assert!(scheduler.stop(session));
    let last = actuator.last_command().unwrap();
    assert_eq!((last.low, last.high), (0.0, 0.0));
    assert!(!scheduler.is_valid(session));
    assert!(!scheduler.is_busy(DeviceId(1)));
}

#[test]
fn new_play_supersedes_a_cancelled_session() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let token = CancelToken::new();
    let options = PlayOptions::default().cancel_token(token.clone());
    let first = scheduler
        .play(PlayRequest::new(one_second_ramp(), device.clone()).with_options(options))
        .unwrap();
    token.cancel();
    scheduler.tick(FrameTick::variable(0.02));

    let second = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();
    assert!(!scheduler.is_valid(first));
    assert!(scheduler.is_valid(second));

    // initial write, zero on supersession, initial write
    let commands = actuator.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!((commands[1].low, commands[1].high), (0.0, 0.0));
}

#[test]
fn unprepared_emphasis_clip_is_ducked_during_playback() {
    let clip = HapticClip::builder()
        .amplitude(0.0, 0.5)
        .emphasis(
            1.0,
            0.5,
            Emphasis {
                amplitude: 1.0,
                frequency: 1.0,
            },
        )
        .amplitude(2.0, 0.5)
        .build()
        .unwrap();
    assert!(clip.keyframes().is_none());

    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    scheduler
        .play(PlayRequest::new(Arc::new(clip), device))
        .unwrap();

    // 0.985 s lies in the ducking window before the accent.
    scheduler.tick(FrameTick::variable(0.985));
    let ducked = actuator.last_command().unwrap();
    assert_abs_diff_eq!(ducked.low, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(ducked.high, 0.0, epsilon = 1e-6);

    // 1.015 s is inside the full-strength pulse.
    scheduler.tick(FrameTick::variable(0.03));
    let pulse = actuator.last_command().unwrap();
    assert_abs_diff_eq!(pulse.low, 1.0 / 2f32.sqrt(), epsilon = 1e-4);
}

#[test]
fn write_failure_does_not_end_the_session() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    actuator.set_failing(true);
    let report = scheduler.tick(FrameTick::variable(0.02));
    assert_eq!(report.failed, 1);
    assert!(scheduler.is_valid(session));

    actuator.set_failing(false);
    let report = scheduler.tick(FrameTick::variable(0.02));
    assert_eq!(report.written, 1);
    assert!(scheduler.is_valid(session));
}

#[test]
fn non_looping_completion_writes_zero_and_goes_idle() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    let report = run(&scheduler, 2, 0.6);
    assert_eq!(report.completed, 1);
    let last = actuator.last_command().unwrap();
    assert_eq!((last.low, last.high), (0.0, 0.0));
    assert!(!scheduler.is_busy(DeviceId(1)));
    assert!(!scheduler.is_valid(session));
}

#[test]
fn looping_session_wraps_with_overshoot() {
    let scheduler = Scheduler::default();
    let (device, _) = continuous(1);
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device).looping(true))
        .unwrap();

    // 2.4 s of a 1 s clip lands 0.4 s into the third cycle.
    let report = run(&scheduler, 4, 0.6);
    assert_eq!(report.completed, 0);
    assert_eq!(report.written, 4);
    assert!(scheduler.is_valid(session));
    assert_abs_diff_eq!(scheduler.position(session).unwrap(), 0.4, epsilon = 1e-4);
}

#[test]
fn fixed_step_sessions_only_follow_fixed_ticks() {
    let scheduler = Scheduler::default();
    let (device, actuator) = continuous(1);
    let options = PlayOptions::default().fixed_step(true);
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device).with_options(options))
        .unwrap();

    scheduler.tick(FrameTick::variable(0.5));
    assert_eq!(actuator.command_count(), 1);
    assert_eq!(scheduler.position(session).unwrap(), 0.0);

    scheduler.tick(FrameTick::fixed(0.02));
    assert_eq!(actuator.command_count(), 2);
}

#[test]
fn devices_play_independently() {
    let scheduler = Scheduler::default();
    let (pad, pad_rec) = continuous(1);
    let (wheel, wheel_rec) = wireless(2);
    let a = scheduler
        .play(PlayRequest::new(one_second_ramp(), pad))
        .unwrap();
    let b = scheduler
        .play(PlayRequest::new(one_second_ramp(), wheel))
        .unwrap();

    assert!(scheduler.stop_device(DeviceId(1)));
    assert!(!scheduler.is_valid(a));
    assert!(scheduler.is_valid(b));

    let pad_count = pad_rec.command_count();
    run(&scheduler, 10, 0.05);
    assert_eq!(pad_rec.command_count(), pad_count);
    assert!(wheel_rec.command_count() > 1);
}

#[test]
fn scheduler_can_be_ticked_from_another_thread() {
    let scheduler = Arc::new(Scheduler::default());
    let (device, actuator) = continuous(7);
    let session = scheduler
        .play(PlayRequest::new(one_second_ramp(), device))
        .unwrap();

    let worker = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || run(&scheduler, 20, 0.01))
    };
    let report = worker.join().unwrap();

    assert_eq!(report.written, 20);
    assert!(scheduler.is_valid(session));
    assert_eq!(actuator.command_count(), 21);
}
