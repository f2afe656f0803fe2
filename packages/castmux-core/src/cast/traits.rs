//! Trait abstractions for the Cast transport.
//!
//! The router depends on these traits rather than on a concrete Cast SDK
//! binding, which keeps it testable and lets embedders plug in whatever
//! connection they already own.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ActiveInputState, ApplicationMetadata, ReceiverVolume};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors reported by a [`CastTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection to the sink is neither established nor being established.
    #[error("transport is not connected")]
    NotConnected,

    /// Sending or (un)registering failed on the wire.
    #[error("I/O error: {0}")]
    Io(String),

    /// The queried value is not available in the current connection state.
    #[error("invalid transport state: {0}")]
    State(String),

    /// The receiver answered the request with an error status.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Receives messages the receiver application sends on a namespace.
pub trait CastMessageHandler: Send + Sync {
    fn on_message_received(&self, namespace: &str, message: &str);
}

/// Connection to one Cast sink backing one application session.
///
/// Connection state is polled synchronously before every namespace or message
/// operation. `send_message` and `stop_application` resolve later; the router
/// runs them through its [`TaskSpawner`](crate::runtime::TaskSpawner).
///
/// Synchronous methods must not call back into the router that invoked them.
#[async_trait]
pub trait CastTransport: Send + Sync {
    /// Returns `true` once the connection to the sink is established.
    fn is_connected(&self) -> bool;

    /// Returns `true` while the connection is being (re)established.
    fn is_connecting(&self) -> bool;

    /// Sends `message` to the receiver application on `namespace`.
    async fn send_message(&self, namespace: &str, message: &str) -> TransportResult<()>;

    /// Stops the receiver application identified by `session_id`.
    async fn stop_application(&self, session_id: &str) -> TransportResult<()>;

    /// Routes messages arriving on `namespace` to `handler`, replacing any
    /// previously registered handler for that namespace.
    fn set_message_received_callback(
        &self,
        namespace: &str,
        handler: Arc<dyn CastMessageHandler>,
    ) -> TransportResult<()>;

    /// Stops routing messages arriving on `namespace`.
    fn remove_message_received_callback(&self, namespace: &str) -> TransportResult<()>;

    /// Current status text of the running application.
    fn application_status(&self) -> TransportResult<String>;

    /// Metadata of the running application.
    fn application_metadata(&self) -> TransportResult<ApplicationMetadata>;

    /// Device volume and mute state.
    fn volume(&self) -> TransportResult<ReceiverVolume>;

    /// Whether the sink's display currently shows the cast input.
    fn active_input_state(&self) -> TransportResult<ActiveInputState>;

    /// Returns `true` when the transport can carry namespace traffic.
    fn is_usable(&self) -> bool {
        self.is_connected() || self.is_connecting()
    }
}
