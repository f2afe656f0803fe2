//! Description of an established session, as handed to the router.
//!
//! [`SessionDescriptor`] carries everything the router needs to know about a
//! session that the transport has already launched. Embedders build it from
//! their own state (the CLI builds it from its YAML config).

use serde::{Deserialize, Serialize};

use crate::cast::{ApplicationMetadata, CastSink, MediaSource};
use crate::error::{CastmuxError, CastmuxResult};

/// An application session running on a sink, plus the route that owns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    /// Cast session id of the running application.
    pub session_id: String,
    /// Media route id the router reports under.
    pub route_id: String,
    /// Origin of the frame that requested the route.
    pub origin: String,
    /// Id of the tab containing that frame.
    pub tab_id: i32,
    /// What the page asked to cast.
    pub source: MediaSource,
    /// The receiver device.
    pub sink: CastSink,
    /// Application metadata, when the transport has reported it.
    #[serde(default)]
    pub application_metadata: Option<ApplicationMetadata>,
    /// Application status text.
    #[serde(default)]
    pub application_status: String,
}

impl SessionDescriptor {
    /// Checks that the identifiers the router relies on are present.
    ///
    /// # Errors
    ///
    /// Returns [`CastmuxError::Configuration`] naming the first empty identifier.
    pub fn validate(&self) -> CastmuxResult<()> {
        if self.session_id.is_empty() {
            return Err(CastmuxError::Configuration("session id is empty".into()));
        }
        if self.route_id.is_empty() {
            return Err(CastmuxError::Configuration("route id is empty".into()));
        }
        if self.sink.device_id.is_empty() {
            return Err(CastmuxError::Configuration("sink device id is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SessionDescriptor {
        SessionDescriptor {
            session_id: "s1".into(),
            route_id: "route-1".into(),
            origin: "https://example.com".into(),
            tab_id: 3,
            source: MediaSource::new("cast:X"),
            sink: CastSink::new("dev-1", "Living Room"),
            application_metadata: None,
            application_status: String::new(),
        }
    }

    #[test]
    fn complete_descriptor_is_valid() {
        assert!(descriptor().validate().is_ok());
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let mut d = descriptor();
        d.session_id.clear();
        assert!(d.validate().unwrap_err().to_string().contains("session id"));

        let mut d = descriptor();
        d.route_id.clear();
        assert!(d.validate().unwrap_err().to_string().contains("route id"));

        let mut d = descriptor();
        d.sink.device_id.clear();
        assert!(d.validate().unwrap_err().to_string().contains("device id"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let d: SessionDescriptor = serde_json::from_str(
            r#"{"sessionId":"s1","routeId":"r","origin":"o","tabId":1,"source":"cast:X",
                "sink":{"deviceId":"d","friendlyName":"f"}}"#,
        )
        .unwrap();
        assert!(d.application_metadata.is_none());
        assert_eq!(d.source.urn(), "cast:X");
    }
}
