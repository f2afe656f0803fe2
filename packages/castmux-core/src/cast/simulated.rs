//! In-memory [`CastTransport`] used by the replay CLI and tests.
//!
//! Nothing leaves the process: sent messages and stop requests are recorded,
//! status queries answer from configured values, and receiver traffic can be
//! injected into whichever handler is registered for a namespace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{CastMessageHandler, CastTransport, TransportError, TransportResult};
use super::types::{ActiveInputState, ApplicationMetadata, ReceiverVolume};

#[derive(Default)]
struct SimulatedState {
    application_status: String,
    application_metadata: ApplicationMetadata,
    volume: ReceiverVolume,
    active_input: ActiveInputState,
    handlers: HashMap<String, Arc<dyn CastMessageHandler>>,
    sent: Vec<(String, String)>,
    stop_calls: Vec<String>,
}

/// Transport that records traffic instead of talking to a device.
pub struct SimulatedTransport {
    connected: AtomicBool,
    connecting: AtomicBool,
    stop_delay: Duration,
    state: Mutex<SimulatedState>,
}

impl SimulatedTransport {
    /// Creates a connected transport answering with the given application.
    pub fn new(application_status: impl Into<String>, metadata: ApplicationMetadata) -> Self {
        Self {
            connected: AtomicBool::new(true),
            connecting: AtomicBool::new(false),
            stop_delay: Duration::ZERO,
            state: Mutex::new(SimulatedState {
                application_status: application_status.into(),
                application_metadata: metadata,
                ..Default::default()
            }),
        }
    }

    /// Delays every `stop_application` completion by `delay`.
    ///
    /// Requires a Tokio runtime when non-zero.
    #[must_use]
    pub fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    #[must_use]
    pub fn with_volume(self, volume: ReceiverVolume) -> Self {
        self.state.lock().volume = volume;
        self
    }

    #[must_use]
    pub fn with_active_input(self, active_input: ActiveInputState) -> Self {
        self.state.lock().active_input = active_input;
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_connecting(&self, connecting: bool) {
        self.connecting.store(connecting, Ordering::SeqCst);
    }

    pub fn set_application_status(&self, status: impl Into<String>) {
        self.state.lock().application_status = status.into();
    }

    pub fn set_application_metadata(&self, metadata: ApplicationMetadata) {
        self.state.lock().application_metadata = metadata;
    }

    /// Every `(namespace, message)` passed to `send_message`, in order.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.state.lock().sent.clone()
    }

    /// Session ids passed to `stop_application`, in order.
    pub fn stop_calls(&self) -> Vec<String> {
        self.state.lock().stop_calls.clone()
    }

    /// Namespaces that currently have a handler, sorted.
    pub fn registered_namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.state.lock().handlers.keys().cloned().collect();
        namespaces.sort();
        namespaces
    }

    /// Delivers `message` as if the receiver had sent it on `namespace`.
    ///
    /// Returns `false` when no handler is registered for the namespace.
    pub fn inject(&self, namespace: &str, message: &str) -> bool {
        let handler = self.state.lock().handlers.get(namespace).cloned();
        match handler {
            Some(handler) => {
                handler.on_message_received(namespace, message);
                true
            }
            None => {
                tracing::debug!(namespace, "no handler registered, dropping injected message");
                false
            }
        }
    }

    fn ensure_usable(&self) -> TransportResult<()> {
        if self.is_usable() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

#[async_trait]
impl CastTransport for SimulatedTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    async fn send_message(&self, namespace: &str, message: &str) -> TransportResult<()> {
        self.ensure_usable()?;
        self.state
            .lock()
            .sent
            .push((namespace.to_string(), message.to_string()));
        Ok(())
    }

    async fn stop_application(&self, session_id: &str) -> TransportResult<()> {
        self.ensure_usable()?;
        self.state.lock().stop_calls.push(session_id.to_string());
        if !self.stop_delay.is_zero() {
            tokio::time::sleep(self.stop_delay).await;
        }
        Ok(())
    }

    fn set_message_received_callback(
        &self,
        namespace: &str,
        handler: Arc<dyn CastMessageHandler>,
    ) -> TransportResult<()> {
        self.ensure_usable()?;
        self.state
            .lock()
            .handlers
            .insert(namespace.to_string(), handler);
        Ok(())
    }

    fn remove_message_received_callback(&self, namespace: &str) -> TransportResult<()> {
        self.ensure_usable()?;
        self.state.lock().handlers.remove(namespace);
        Ok(())
    }

    fn application_status(&self) -> TransportResult<String> {
        self.ensure_usable()
            .map_err(|_| TransportError::State("no application status while disconnected".into()))?;
        Ok(self.state.lock().application_status.clone())
    }

    fn application_metadata(&self) -> TransportResult<ApplicationMetadata> {
        self.ensure_usable().map_err(|_| {
            TransportError::State("no application metadata while disconnected".into())
        })?;
        Ok(self.state.lock().application_metadata.clone())
    }

    fn volume(&self) -> TransportResult<ReceiverVolume> {
        self.ensure_usable()?;
        Ok(self.state.lock().volume)
    }

    fn active_input_state(&self) -> TransportResult<ActiveInputState> {
        self.ensure_usable()?;
        Ok(self.state.lock().active_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingHandler {
        count: AtomicUsize,
    }

    impl CastMessageHandler for CountingHandler {
        fn on_message_received(&self, _namespace: &str, _message: &str) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn transport() -> SimulatedTransport {
        SimulatedTransport::new("Ready", ApplicationMetadata::new("APP", "App"))
    }

    #[tokio::test]
    async fn records_sent_messages_in_order() {
        let transport = transport();
        transport.send_message("ns-a", "{}").await.unwrap();
        transport.send_message("ns-b", "[]").await.unwrap();

        assert_eq!(
            transport.sent_messages(),
            vec![
                ("ns-a".to_string(), "{}".to_string()),
                ("ns-b".to_string(), "[]".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn disconnected_transport_rejects_operations() {
        let transport = transport();
        transport.set_connected(false);

        assert_eq!(
            transport.send_message("ns", "{}").await,
            Err(TransportError::NotConnected)
        );
        assert!(matches!(
            transport.application_status(),
            Err(TransportError::State(_))
        ));
        assert!(transport.sent_messages().is_empty());
    }

    #[test]
    fn connecting_counts_as_usable() {
        let transport = transport();
        transport.set_connected(false);
        transport.set_connecting(true);
        assert!(transport.is_usable());
    }

    #[test]
    fn inject_reaches_registered_handler_only() {
        let transport = transport();
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        transport
            .set_message_received_callback("ns", handler.clone())
            .unwrap();

        assert!(transport.inject("ns", "{}"));
        assert!(!transport.inject("other", "{}"));
        assert_eq!(handler.count.load(Ordering::SeqCst), 1);

        transport.remove_message_received_callback("ns").unwrap();
        assert!(!transport.inject("ns", "{}"));
        assert!(transport.registered_namespaces().is_empty());
    }

    #[test]
    fn queries_answer_with_configured_values() {
        let transport = transport()
            .with_volume(ReceiverVolume {
                level: 0.4,
                muted: true,
            })
            .with_active_input(ActiveInputState::Inactive);
        transport.set_application_status("Buffering");
        transport.set_application_metadata(
            ApplicationMetadata::new("APP2", "Other").with_namespace("urn:x-cast:com.example"),
        );

        assert_eq!(
            transport.volume().unwrap(),
            ReceiverVolume {
                level: 0.4,
                muted: true
            }
        );
        assert_eq!(transport.active_input_state().unwrap(), ActiveInputState::Inactive);
        assert_eq!(transport.application_status().unwrap(), "Buffering");
        let metadata = transport.application_metadata().unwrap();
        assert_eq!(metadata.application_id, "APP2");
        assert!(metadata.is_namespace_supported("urn:x-cast:com.example"));
    }

    #[tokio::test]
    async fn stop_application_is_recorded() {
        let transport = transport().with_stop_delay(Duration::from_millis(1));
        transport.stop_application("session-1").await.unwrap();
        assert_eq!(transport.stop_calls(), vec!["session-1".to_string()]);
    }
}
