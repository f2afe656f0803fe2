//! Session configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use castmux_core::{
    ActiveInputState, ApplicationMetadata, CastSink, MediaSource, ReceiverVolume,
    SessionDescriptor, SinkCapability,
};
use serde::Deserialize;

/// Receiver device the simulated session runs on.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub device_id: String,
    pub friendly_name: String,
    pub capabilities: Vec<SinkCapability>,

    /// Volume level in `0.0..=1.0`.
    pub volume: f64,

    pub muted: bool,

    /// `unknown`, `inactive` or `active`.
    pub active_input: ActiveInputState,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            device_id: "castmux-sim".to_string(),
            friendly_name: "Simulated Receiver".to_string(),
            capabilities: vec![SinkCapability::AudioOut, SinkCapability::VideoOut],
            volume: 1.0,
            muted: false,
            active_input: ActiveInputState::Unknown,
        }
    }
}

impl SinkConfig {
    /// Volume the simulated receiver reports, with the level clamped to `0.0..=1.0`.
    pub fn receiver_volume(&self) -> ReceiverVolume {
        ReceiverVolume {
            level: self.volume.clamp(0.0, 1.0),
            muted: self.muted,
        }
    }
}

/// Receiver application the session belongs to.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub app_id: String,
    pub display_name: String,
    /// Namespaces the application declares, besides receiver and media.
    pub namespaces: Vec<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            app_id: "CC1AD845".to_string(),
            display_name: "Default Media Receiver".to_string(),
            namespaces: Vec::new(),
        }
    }
}

/// Session configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Cast session id. A random UUID is used when empty.
    /// Override: `CASTMUX_SESSION_ID`
    pub session_id: Option<String>,

    /// Route id reported with every delegate event.
    /// Override: `CASTMUX_ROUTE_ID`
    pub route_id: String,

    /// Origin of the frame that owns the route.
    /// Override: `CASTMUX_ORIGIN`
    pub origin: String,

    pub tab_id: i32,

    /// Media source URN, e.g. `cast:CC1AD845`.
    pub source: String,

    pub sink: SinkConfig,

    pub application: ApplicationConfig,

    /// Application status text reported in session snapshots.
    pub status_text: String,

    /// How long the simulated receiver takes to stop the application.
    pub stop_delay_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            route_id: "castmux-route".to_string(),
            origin: "https://localhost".to_string(),
            tab_id: -1,
            source: "cast:CC1AD845".to_string(),
            sink: SinkConfig::default(),
            application: ApplicationConfig::default(),
            status_text: "Ready To Cast".to_string(),
            stop_delay_ms: 0,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CASTMUX_SESSION_ID") {
            self.session_id = Some(val);
        }

        if let Some(val) = lookup("CASTMUX_ROUTE_ID") {
            self.route_id = val;
        }

        if let Some(val) = lookup("CASTMUX_ORIGIN") {
            self.origin = val;
        }
    }

    pub fn stop_delay(&self) -> Duration {
        Duration::from_millis(self.stop_delay_ms)
    }

    /// Application metadata the simulated receiver reports.
    pub fn application_metadata(&self) -> ApplicationMetadata {
        self.application.namespaces.iter().fold(
            ApplicationMetadata::new(&self.application.app_id, &self.application.display_name),
            |metadata, namespace| metadata.with_namespace(namespace),
        )
    }

    /// Converts to castmux-core's SessionDescriptor type.
    pub fn to_session_descriptor(&self) -> SessionDescriptor {
        let session_id = self
            .session_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        SessionDescriptor {
            session_id,
            route_id: self.route_id.clone(),
            origin: self.origin.clone(),
            tab_id: self.tab_id,
            source: MediaSource::new(&self.source),
            sink: CastSink::new(&self.sink.device_id, &self.sink.friendly_name)
                .with_capabilities(&self.sink.capabilities),
            application_metadata: Some(self.application_metadata()),
            application_status: self.status_text.clone(),
        }
    }
}
