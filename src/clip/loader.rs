//! `.haptic` file loading.

use std::fs;
use std::path::Path;

use log::debug;

use super::data_model::HapticDocument;
use super::HapticClip;
use crate::envelope::Envelope;
use crate::{Result, RumbleError};

/// Decode a `.haptic` JSON document.
///
/// An empty frequency envelope is accepted and treated as a neutral 0.5
/// during playback.
///
/// # Errors
/// Returns [`RumbleError::InvalidEnvelope`] if the bytes are not valid JSON
/// in the expected layout or the amplitude envelope is empty or unordered.
pub fn load_bytes(data: &[u8]) -> Result<HapticClip> {
    let document: HapticDocument = serde_json::from_slice(data)
        .map_err(|e| RumbleError::InvalidEnvelope(format!("malformed haptic data: {e}")))?;

    let envelopes = document.signals.continuous.envelopes;
    let amplitude = Envelope::new(envelopes.amplitude)?;
    let frequency = if envelopes.frequency.is_empty() {
        None
    } else {
        Some(Envelope::new(envelopes.frequency)?)
    };

    debug!(
        "decoded haptic clip v{}.{}.{}: {} amplitude / {} frequency breakpoints, {} emphasis",
        document.version.major,
        document.version.minor,
        document.version.patch,
        amplitude.len(),
        frequency.as_ref().map_or(0, Envelope::len),
        amplitude.emphasis_count()
    );

    Ok(HapticClip::from_parts(
        amplitude,
        frequency,
        document.version,
        document.metadata,
    ))
}

/// Read and decode a `.haptic` file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<HapticClip> {
    let data = fs::read(path.as_ref())?;
    load_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KICK: &str = r#"{
        "version": { "major": 1, "minor": 0, "patch": 0 },
        "metadata": { "editor": "Haptic Composer", "tags": ["kick"] },
        "signals": { "continuous": { "envelopes": {
            "amplitude": [
                { "time": 0.0, "amplitude": 0.5 },
                { "time": 1.0, "amplitude": 0.5, "emphasis": { "amplitude": 1.0, "frequency": 0.8 } },
                { "time": 2.0, "amplitude": 0.5 }
            ],
            "frequency": [
                { "time": 0.0, "frequency": 0.2 },
                { "time": 2.0, "frequency": 0.6 }
            ]
        } } }
    }"#;

    #[test]
    fn decodes_reference_layout() {
        let clip = load_bytes(KICK.as_bytes()).unwrap();
        assert_eq!(clip.amplitude().len(), 3);
        assert_eq!(clip.amplitude().emphasis_count(), 1);
        assert_eq!(clip.frequency().map(Envelope::len), Some(2));
        assert_eq!(clip.duration(), 2.0);
        assert_eq!(clip.version().major, 1);
        assert_eq!(clip.metadata().editor.as_deref(), Some("Haptic Composer"));
        assert_eq!(clip.metadata().tags, vec!["kick".to_string()]);
        assert!(clip.keyframes().is_none());
    }

    #[test]
    fn missing_frequency_is_none() {
        let json = r#"{ "signals": { "continuous": { "envelopes": {
            "amplitude": [ { "time": 0.0, "amplitude": 1.0 } ]
        } } } }"#;
        let clip = load_bytes(json.as_bytes()).unwrap();
        assert!(clip.frequency().is_none());
    }

    #[test]
    fn empty_amplitude_is_invalid_envelope() {
        let json = r#"{ "signals": { "continuous": { "envelopes": { "amplitude": [] } } } }"#;
        assert!(matches!(
            load_bytes(json.as_bytes()),
            Err(RumbleError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn malformed_json_is_invalid_envelope() {
        assert!(matches!(
            load_bytes(b"{ \"signals\": "),
            Err(RumbleError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            load_bytes(br#"{ "signals": { "continuous": { "envelopes": { "amplitude": [ { "time": "soon" } ] } } } }"#),
            Err(RumbleError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick.haptic");
        std::fs::write(&path, KICK).unwrap();
        let clip = load_file(&path).unwrap();
        assert_eq!(clip.amplitude().len(), 3);

        assert!(matches!(
            load_file(dir.path().join("missing.haptic")),
            Err(RumbleError::Io(_))
        ));
    }
}
