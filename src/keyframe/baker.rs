//! Offline quantization of continuous envelopes.

use log::debug;

use super::{Keyframe, KeyframeTable};
use crate::crossfade::CrossfadeMode;
use crate::envelope::{AmplitudeBreakpoint, Envelope, EnvelopeSampler, FrequencyBreakpoint};
use crate::{Result, RumbleError};

/// Frequency used when a clip has no frequency envelope.
const NEUTRAL_FREQUENCY: f32 = 0.5;

/// Tolerance so `2.0 s × 25 Hz` is 50 frames, not 51 from float noise.
const FRAME_COUNT_TOLERANCE: f32 = 1e-6;

/// Number of frames needed to cover `duration` seconds at `frame_rate`.
pub fn frame_count_for(duration: f32, frame_rate: f32) -> usize {
    let frames = duration * frame_rate - FRAME_COUNT_TOLERANCE;
    if frames <= 0.0 {
        0
    } else {
        frames.ceil() as usize
    }
}

/// Bake amplitude and frequency envelopes into a fixed-rate keyframe table.
///
/// Frame `i` holds the crossfaded channel intensities at `i / frame_rate`
/// seconds, sampled without looping. The table spans the amplitude
/// envelope's duration. A missing frequency envelope is treated as a
/// constant 0.5.
///
/// # Errors
/// Returns [`RumbleError::ConfigError`] if `frame_rate` is not a positive
/// finite number.
pub fn bake(
    amplitude: &Envelope<AmplitudeBreakpoint>,
    frequency: Option<&Envelope<FrequencyBreakpoint>>,
    frame_rate: f32,
    mode: &CrossfadeMode,
) -> Result<KeyframeTable> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(RumbleError::ConfigError(format!(
            "frame rate must be positive, got {frame_rate}"
        )));
    }

    let duration = amplitude.duration();
    let frame_count = frame_count_for(duration, frame_rate);

    let mut amplitude_sampler = EnvelopeSampler::new();
    let mut frequency_sampler = EnvelopeSampler::new();
    let frames = (0..frame_count)
        .map(|i| {
            let t = i as f32 / frame_rate;
            let a = amplitude_sampler.sample_at(amplitude, t, false);
            let f = frequency.map_or(NEUTRAL_FREQUENCY, |env| {
                frequency_sampler.sample_at(env, t, false)
            });
            let (low, high) = mode.map(a, f);
            Keyframe { low, high }
        })
        .collect::<Vec<_>>();

    debug!(
        "baked {} keyframes at {} Hz over {:.3}s",
        frames.len(),
        frame_rate,
        duration
    );

    Ok(KeyframeTable::from_parts(frames, frame_rate, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::sample_envelope;
    use approx::assert_abs_diff_eq;

    fn amplitude() -> Envelope<AmplitudeBreakpoint> {
        Envelope::new(vec![
            AmplitudeBreakpoint::new(0.0, 0.0),
            AmplitudeBreakpoint::new(0.5, 1.0),
            AmplitudeBreakpoint::new(2.0, 0.25),
        ])
        .unwrap()
    }

    fn frequency() -> Envelope<FrequencyBreakpoint> {
        Envelope::new(vec![
            FrequencyBreakpoint::new(0.0, 0.1),
            FrequencyBreakpoint::new(2.0, 0.9),
        ])
        .unwrap()
    }

    #[test]
    fn two_seconds_at_25hz_is_50_frames() {
        let table = bake(&amplitude(), Some(&frequency()), 25.0, &CrossfadeMode::Linear).unwrap();
        assert_eq!(table.frame_count(), 50);
        assert_eq!(table.frame_rate(), 25.0);
        assert_eq!(table.duration(), 2.0);
    }

    #[test]
    fn frames_match_continuous_samples() {
        let amp = amplitude();
        let freq = frequency();
        let mode = CrossfadeMode::EqualPower;
        let table = bake(&amp, Some(&freq), 25.0, &mode).unwrap();

        for (i, frame) in table.frames().iter().enumerate() {
            let t = i as f32 / 25.0;
            let (low, high) = mode.map(sample_envelope(&amp, t), sample_envelope(&freq, t));
            assert_abs_diff_eq!(frame.low, low, epsilon = 1e-5);
            assert_abs_diff_eq!(frame.high, high, epsilon = 1e-5);
        }
    }

    #[test]
    fn missing_frequency_defaults_to_half() {
        let table = bake(&amplitude(), None, 25.0, &CrossfadeMode::Linear).unwrap();
        let frame = table.frame_at(25).unwrap();
        assert_abs_diff_eq!(frame.low, frame.high, epsilon = 1e-6);
    }

    #[test]
    fn invalid_frame_rate_is_rejected() {
        for rate in [0.0, -25.0, f32::NAN] {
            assert!(matches!(
                bake(&amplitude(), None, rate, &CrossfadeMode::Linear),
                Err(RumbleError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn frame_count_rounds_up_partial_frames() {
        assert_eq!(frame_count_for(2.0, 25.0), 50);
        assert_eq!(frame_count_for(0.28, 25.0), 7);
        assert_eq!(frame_count_for(0.29, 25.0), 8);
        assert_eq!(frame_count_for(0.0, 25.0), 0);
    }
}
