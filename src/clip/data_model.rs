//! Serde layout of the `.haptic` JSON format (version 1).

use serde::{Deserialize, Serialize};

use crate::envelope::{AmplitudeBreakpoint, FrequencyBreakpoint};

/// Format version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

/// Authoring metadata. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipMetadata {
    /// Editor that produced the clip
    pub editor: Option<String>,
    /// Clip author
    pub author: Option<String>,
    /// Source audio file
    pub source: Option<String>,
    /// Project name
    pub project: Option<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Free-form description
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HapticDocument {
    pub version: FormatVersion,
    pub metadata: ClipMetadata,
    pub signals: Signals,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Signals {
    pub continuous: ContinuousSignal,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ContinuousSignal {
    pub envelopes: Envelopes,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Envelopes {
    pub amplitude: Vec<AmplitudeBreakpoint>,
    pub frequency: Vec<FrequencyBreakpoint>,
}
