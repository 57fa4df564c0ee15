//! Haptic clips
//!
//! A clip is immutable once built: an amplitude envelope, an optional
//! frequency envelope and, after [`HapticClip::prepare`], a baked keyframe
//! table for wireless playback. Clips are shared between sessions through
//! `Arc`.

mod data_model;
#[cfg(feature = "json")]
mod loader;

pub use data_model::{ClipMetadata, FormatVersion};
#[cfg(feature = "json")]
pub use loader::{load_bytes, load_file};

use std::sync::Arc;

use log::debug;

use crate::config::EngineConfig;
use crate::emphasis;
use crate::envelope::{AmplitudeBreakpoint, Emphasis, Envelope, FrequencyBreakpoint};
use crate::keyframe::{self, KeyframeTable};
use crate::Result;

/// Immutable haptic clip.
#[derive(Debug, Clone, PartialEq)]
pub struct HapticClip {
    amplitude: Envelope<AmplitudeBreakpoint>,
    frequency: Option<Envelope<FrequencyBreakpoint>>,
    keyframes: Option<Arc<KeyframeTable>>,
    version: FormatVersion,
    metadata: ClipMetadata,
}

impl HapticClip {
    /// Create a clip from validated envelopes.
    pub fn new(
        amplitude: Envelope<AmplitudeBreakpoint>,
        frequency: Option<Envelope<FrequencyBreakpoint>>,
    ) -> Self {
        Self::from_parts(amplitude, frequency, FormatVersion::default(), ClipMetadata::default())
    }

    /// Start building a clip breakpoint by breakpoint.
    pub fn builder() -> HapticClipBuilder {
        HapticClipBuilder::default()
    }

    pub(crate) fn from_parts(
        amplitude: Envelope<AmplitudeBreakpoint>,
        frequency: Option<Envelope<FrequencyBreakpoint>>,
        version: FormatVersion,
        metadata: ClipMetadata,
    ) -> Self {
        Self {
            amplitude,
            frequency,
            keyframes: None,
            version,
            metadata,
        }
    }

    /// Render emphasis accents and bake the keyframe table.
    ///
    /// This is the import-time step. The rendered amplitude envelope
    /// carries no emphasis tags, so preparing twice only re-bakes.
    pub fn prepare(mut self, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        if self.amplitude.emphasis_count() > 0 {
            self.amplitude = emphasis::render(&self.amplitude, &config.emphasis)?;
        }
        let table = keyframe::bake(
            &self.amplitude,
            self.frequency.as_ref(),
            config.keyframe_rate,
            &config.crossfade,
        )?;
        debug!(
            "prepared clip: {} breakpoints, {} keyframes at {} Hz",
            self.amplitude.len(),
            table.frame_count(),
            table.frame_rate()
        );
        self.keyframes = Some(Arc::new(table));
        Ok(self)
    }

    /// Amplitude envelope.
    pub fn amplitude(&self) -> &Envelope<AmplitudeBreakpoint> {
        &self.amplitude
    }

    /// Frequency envelope, if the clip has one.
    pub fn frequency(&self) -> Option<&Envelope<FrequencyBreakpoint>> {
        self.frequency.as_ref()
    }

    /// Baked keyframes, present after [`prepare`](Self::prepare).
    pub fn keyframes(&self) -> Option<&Arc<KeyframeTable>> {
        self.keyframes.as_ref()
    }

    /// Clip length in seconds (time of the last amplitude breakpoint).
    pub fn duration(&self) -> f32 {
        self.amplitude.duration()
    }

    /// Format version the clip was decoded from.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Authoring metadata.
    pub fn metadata(&self) -> &ClipMetadata {
        &self.metadata
    }
}

/// Incremental [`HapticClip`] construction.
#[derive(Debug, Clone, Default)]
pub struct HapticClipBuilder {
    amplitude: Vec<AmplitudeBreakpoint>,
    frequency: Vec<FrequencyBreakpoint>,
    metadata: ClipMetadata,
}

impl HapticClipBuilder {
    /// Append a plain amplitude breakpoint.
    pub fn amplitude(mut self, time: f32, amplitude: f32) -> Self {
        self.amplitude.push(AmplitudeBreakpoint::new(time, amplitude));
        self
    }

    /// Append an amplitude breakpoint carrying an emphasis accent.
    pub fn emphasis(mut self, time: f32, amplitude: f32, emphasis: Emphasis) -> Self {
        self.amplitude
            .push(AmplitudeBreakpoint::emphasized(time, amplitude, emphasis));
        self
    }

    /// Append a frequency breakpoint.
    pub fn frequency(mut self, time: f32, frequency: f32) -> Self {
        self.frequency.push(FrequencyBreakpoint::new(time, frequency));
        self
    }

    /// Attach authoring metadata.
    pub fn metadata(mut self, metadata: ClipMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate the envelopes and build the clip.
    ///
    /// # Errors
    /// Returns [`crate::RumbleError::InvalidEnvelope`] if no amplitude
    /// breakpoint was added or either envelope is malformed.
    pub fn build(self) -> Result<HapticClip> {
        let amplitude = Envelope::new(self.amplitude)?;
        let frequency = if self.frequency.is_empty() {
            None
        } else {
            Some(Envelope::new(self.frequency)?)
        };
        Ok(HapticClip::from_parts(
            amplitude,
            frequency,
            FormatVersion::default(),
            self.metadata,
        ))
    }
}
