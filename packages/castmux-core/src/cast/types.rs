//! Domain types describing a Cast sink and the application running on it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Hardware capability advertised by a Cast sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkCapability {
    AudioIn,
    AudioOut,
    VideoIn,
    VideoOut,
}

impl SinkCapability {
    /// All capabilities in the order they are reported to pages.
    pub const ALL: [SinkCapability; 4] = [
        SinkCapability::AudioIn,
        SinkCapability::AudioOut,
        SinkCapability::VideoIn,
        SinkCapability::VideoOut,
    ];

    /// Wire name used in session snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AudioIn => "audio_in",
            Self::AudioOut => "audio_out",
            Self::VideoIn => "video_in",
            Self::VideoOut => "video_out",
        }
    }
}

/// The physical Cast receiver a session runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastSink {
    /// Stable device identifier. Doubles as the sink id of the route.
    pub device_id: String,
    /// Human readable device name.
    pub friendly_name: String,
    /// Advertised capabilities, in any order.
    #[serde(default)]
    pub capabilities: Vec<SinkCapability>,
}

impl CastSink {
    pub fn new(device_id: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            friendly_name: friendly_name.into(),
            capabilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: &[SinkCapability]) -> Self {
        self.capabilities = capabilities.to_vec();
        self
    }

    pub fn has_capability(&self, capability: SinkCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Capability names in canonical order (`audio_in`, `audio_out`,
    /// `video_in`, `video_out`), duplicates removed.
    pub fn capability_names(&self) -> Vec<&'static str> {
        SinkCapability::ALL
            .into_iter()
            .filter(|c| self.has_capability(*c))
            .map(SinkCapability::as_str)
            .collect()
    }
}

/// Metadata of the receiver application running in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMetadata {
    /// Cast application id (e.g. `CC1AD845` for the default media receiver).
    pub application_id: String,
    /// Display name of the application.
    pub name: String,
    /// Message namespaces the application declares support for.
    #[serde(default)]
    pub namespaces: BTreeSet<String>,
}

impl ApplicationMetadata {
    pub fn new(application_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            name: name.into(),
            namespaces: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.insert(namespace.into());
        self
    }

    pub fn is_namespace_supported(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }
}

/// URN describing the app or media the page asked to cast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaSource(String);

impl MediaSource {
    pub fn new(urn: impl Into<String>) -> Self {
        Self(urn.into())
    }

    pub fn urn(&self) -> &str {
        &self.0
    }
}

/// Device volume as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiverVolume {
    /// Volume level in `0.0..=1.0`.
    pub level: f64,
    pub muted: bool,
}

impl Default for ReceiverVolume {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

/// Whether the sink's display currently shows the cast input (HDMI-CEC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveInputState {
    #[default]
    Unknown,
    Inactive,
    Active,
}

impl ActiveInputState {
    /// Numeric form used by the page-side protocol (-1, 0, 1).
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Inactive => 0,
            Self::Active => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_use_canonical_order() {
        let sink = CastSink::new("dev-1", "Living Room").with_capabilities(&[
            SinkCapability::VideoOut,
            SinkCapability::AudioOut,
            SinkCapability::AudioOut,
        ]);

        assert_eq!(sink.capability_names(), vec!["audio_out", "video_out"]);
    }

    #[test]
    fn sink_without_capabilities_reports_none() {
        let sink = CastSink::new("dev-1", "Kitchen");
        assert!(sink.capability_names().is_empty());
        assert!(!sink.has_capability(SinkCapability::AudioIn));
    }

    #[test]
    fn metadata_namespace_support() {
        let metadata = ApplicationMetadata::new("CC1AD845", "Default Media Receiver")
            .with_namespace("urn:x-cast:com.example.chat");

        assert!(metadata.is_namespace_supported("urn:x-cast:com.example.chat"));
        assert!(!metadata.is_namespace_supported("urn:x-cast:com.example.other"));
    }

    #[test]
    fn media_source_serializes_as_plain_string() {
        let source = MediaSource::new("cast:CC1AD845");
        assert_eq!(serde_json::to_string(&source).unwrap(), "\"cast:CC1AD845\"");
        assert_eq!(source.urn(), "cast:CC1AD845");
    }

    #[test]
    fn active_input_state_numeric_values() {
        assert_eq!(ActiveInputState::Unknown.as_i32(), -1);
        assert_eq!(ActiveInputState::Inactive.as_i32(), 0);
        assert_eq!(ActiveInputState::Active.as_i32(), 1);
    }

    #[test]
    fn sink_deserializes_from_camel_case() {
        let sink: CastSink = serde_json::from_str(
            r#"{"deviceId":"abc","friendlyName":"Den","capabilities":["audio_out"]}"#,
        )
        .unwrap();
        assert_eq!(sink.device_id, "abc");
        assert!(sink.has_capability(SinkCapability::AudioOut));
    }
}
