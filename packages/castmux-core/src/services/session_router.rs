//! Cast session multiplexing.
//!
//! Responsibilities:
//! - Register page-level clients against one receiver application session
//! - Decode client envelopes and relay media/app messages to the transport
//! - Fan receiver messages out to every client with a shared sequence number
//! - Send session snapshots (`new_session`, `update_session`)
//! - Stop the application and tear the session down exactly once

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};

use super::namespace_registry::NamespaceRegistry;
use super::route_controller::RouteController;
use crate::cast::{
    ApplicationMetadata, CastMessageHandler, CastSink, CastTransport, MediaSource,
    TransportResult,
};
use crate::error::ErrorCode;
use crate::events::RouteDelegate;
use crate::protocol::outbound::empty_snapshot;
use crate::protocol::{
    embed_payload, ensure_request_id, AppMessageBody, CastV2Action, CastV2Payload,
    InboundMessage, OutboundType, ProtocolResult, ReceiverSnapshot, RoutedEnvelope,
    SessionSnapshot,
};
use crate::protocol_constants::{MEDIA_NAMESPACE, RECEIVER_NAMESPACE, SNAPSHOT_SEQUENCE_NUMBER};
use crate::runtime::TaskSpawner;
use crate::state::SessionDescriptor;

/// Lifecycle of the session behind a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The application is running and messages are relayed.
    Open,
    /// `stop_application` has been issued and has not completed yet.
    Closing,
    /// The session id, clients and namespaces have been cleared.
    Closed,
}

/// Route identity: everything that differs between a route and a joined route.
struct RouteIdentity {
    route_id: String,
    origin: String,
    tab_id: i32,
    source: MediaSource,
}

/// Session values a new router starts from.
struct SessionSeed {
    session_id: Option<String>,
    application_metadata: Option<ApplicationMetadata>,
    application_status: String,
}

/// Mutable session state, guarded by the router's lock.
struct RouterInner {
    state: SessionState,
    session_id: Option<String>,
    application_status: String,
    application_metadata: Option<ApplicationMetadata>,
    /// Connected client ids, in connection order.
    clients: Vec<String>,
    namespaces: NamespaceRegistry,
    sequence_number: i32,
}

impl RouterInner {
    fn has_client(&self, client_id: &str) -> bool {
        self.clients.iter().any(|c| c == client_id)
    }

    /// Builds one envelope per client for a shared session event.
    ///
    /// Consumes exactly one sequence number, whatever the client count.
    fn broadcast<M: Serialize + ?Sized>(&mut self, kind: OutboundType, payload: &M) -> Vec<String> {
        let sequence_number = self.sequence_number;
        let outbox = self
            .clients
            .iter()
            .filter_map(|client| RoutedEnvelope::new(kind, payload, client, sequence_number).to_text())
            .collect();
        self.sequence_number = self.sequence_number.wrapping_add(1);
        outbox
    }

    /// Builds one snapshot envelope per client. Does not touch the sequence.
    fn address_to_each(&self, kind: OutboundType, payload: &Value) -> Vec<String> {
        self.clients
            .iter()
            .filter_map(|client| {
                RoutedEnvelope::new(kind, payload, client, SNAPSHOT_SEQUENCE_NUMBER).to_text()
            })
            .collect()
    }
}

/// Multiplexes one Cast application session across page-level clients.
///
/// All state lives behind a single lock that is never held while the
/// delegate is called or while a transport future runs. Envelopes are built
/// under the lock and delivered after it is released.
pub struct CastSessionRouter {
    me: Weak<CastSessionRouter>,
    identity: RouteIdentity,
    sink: CastSink,
    transport: Arc<dyn CastTransport>,
    delegate: Arc<dyn RouteDelegate>,
    spawner: Arc<dyn TaskSpawner>,
    detached: AtomicBool,
    inner: Mutex<RouterInner>,
}

impl CastSessionRouter {
    /// Creates a router for a session the transport has already launched and
    /// registers the receiver and media namespaces.
    ///
    /// If the transport is neither connected nor connecting, registration is
    /// skipped; the namespaces stay unregistered.
    pub fn new(
        descriptor: SessionDescriptor,
        transport: Arc<dyn CastTransport>,
        delegate: Arc<dyn RouteDelegate>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Arc<Self> {
        let SessionDescriptor {
            session_id,
            route_id,
            origin,
            tab_id,
            source,
            sink,
            application_metadata,
            application_status,
        } = descriptor;

        Self::build(
            RouteIdentity {
                route_id,
                origin,
                tab_id,
                source,
            },
            sink,
            SessionSeed {
                session_id: Some(session_id),
                application_metadata,
                application_status,
            },
            transport,
            delegate,
            spawner,
        )
    }

    /// Creates a second route on the same session for a page that joins it.
    ///
    /// The joined router shares the transport, session id, application
    /// state, sink, delegate and spawner. It has its own clients, namespace
    /// registrations and sequence counter.
    pub fn create_joined_controller(
        &self,
        route_id: impl Into<String>,
        origin: impl Into<String>,
        tab_id: i32,
        source: MediaSource,
    ) -> Arc<Self> {
        let seed = {
            let inner = self.inner.lock();
            SessionSeed {
                session_id: inner.session_id.clone(),
                application_metadata: inner.application_metadata.clone(),
                application_status: inner.application_status.clone(),
            }
        };

        Self::build(
            RouteIdentity {
                route_id: route_id.into(),
                origin: origin.into(),
                tab_id,
                source,
            },
            self.sink.clone(),
            seed,
            Arc::clone(&self.transport),
            Arc::clone(&self.delegate),
            Arc::clone(&self.spawner),
        )
    }

    fn build(
        identity: RouteIdentity,
        sink: CastSink,
        seed: SessionSeed,
        transport: Arc<dyn CastTransport>,
        delegate: Arc<dyn RouteDelegate>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Arc<Self> {
        let state = if seed.session_id.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        };

        let router = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            identity,
            sink,
            transport,
            delegate,
            spawner,
            detached: AtomicBool::new(false),
            inner: Mutex::new(RouterInner {
                state,
                session_id: seed.session_id,
                application_status: seed.application_status,
                application_metadata: seed.application_metadata,
                clients: Vec::new(),
                namespaces: NamespaceRegistry::new(),
                sequence_number: 0,
            }),
        });
        router.register_platform_namespaces();
        router
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Id of the Cast session, `None` once the session is closed.
    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().session_id.clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Connected client ids, in connection order.
    pub fn clients(&self) -> Vec<String> {
        self.inner.lock().clients.clone()
    }

    /// Namespaces with a live receive callback, sorted.
    pub fn registered_namespaces(&self) -> Vec<String> {
        self.inner.lock().namespaces.snapshot()
    }

    /// Sequence number the next broadcast will carry.
    pub fn sequence_number(&self) -> i32 {
        self.inner.lock().sequence_number
    }

    pub fn application_status(&self) -> String {
        self.inner.lock().application_status.clone()
    }

    pub fn sink(&self) -> &CastSink {
        &self.sink
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Stops the receiver application and tears the session down.
    ///
    /// Only acts while the session is [`SessionState::Open`] and the transport
    /// is usable; every other call is a no-op. Teardown happens when the stop
    /// completes, whether or not the transport reports success.
    pub fn close(&self) {
        let Some(router) = self.me.upgrade() else {
            return;
        };

        let session_id = {
            let mut inner = self.inner.lock();
            if inner.state != SessionState::Open {
                return;
            }
            if !self.transport.is_usable() {
                tracing::debug!(route_id = %self.identity.route_id, "transport unavailable, not stopping application");
                return;
            }
            let Some(session_id) = inner.session_id.clone() else {
                return;
            };
            inner.state = SessionState::Closing;
            session_id
        };

        tracing::debug!(route_id = %self.identity.route_id, session_id = %session_id, "stopping application");
        let transport = Arc::clone(&self.transport);
        self.spawner.spawn(Box::pin(async move {
            let result = transport.stop_application(&session_id).await;
            router.on_application_stopped(result);
        }));
    }

    fn on_application_stopped(&self, result: TransportResult<()>) {
        if let Err(e) = &result {
            tracing::warn!(
                route_id = %self.identity.route_id,
                code = e.code(),
                error = %e,
                "failed to stop application, clearing session anyway"
            );
        }

        let outbox = {
            let mut inner = self.inner.lock();
            if inner.state != SessionState::Closing {
                return;
            }

            let payload = inner
                .session_id
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null);
            let outbox = inner.broadcast(OutboundType::RemoveSession, &payload);

            tracing::debug!(
                route_id = %self.identity.route_id,
                count = inner.namespaces.len(),
                "unregistering namespaces"
            );
            let namespaces = inner.namespaces.drain();
            for namespace in &namespaces {
                self.unregister_namespace(namespace);
            }

            inner.clients.clear();
            inner.session_id = None;
            inner.state = SessionState::Closed;
            outbox
        };

        self.deliver(outbox);
        self.delegate.on_route_closed(&self.identity.route_id);
    }

    /// Re-reads application status and metadata and sends an
    /// `update_session` snapshot to every client.
    ///
    /// Skipped when the session is closed, the transport is unusable, or the
    /// transport cannot answer.
    pub fn update_session_status(&self) {
        if !self.transport.is_usable() {
            return;
        }

        let outbox = {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Closed {
                return;
            }

            let refreshed = self
                .transport
                .application_status()
                .and_then(|status| Ok((status, self.transport.application_metadata()?)));
            let (status, metadata) = match refreshed {
                Ok(values) => values,
                Err(e) => {
                    tracing::debug!(
                        route_id = %self.identity.route_id,
                        code = e.code(),
                        error = %e,
                        "can't get application status"
                    );
                    return;
                }
            };

            inner.application_status = status;
            inner.application_metadata = Some(metadata);
            let snapshot = self.build_session_message(&inner);
            inner.address_to_each(OutboundType::UpdateSession, &snapshot)
        };

        self.deliver(outbox);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inbound (page → router)
    // ─────────────────────────────────────────────────────────────────────────

    /// Handles a client envelope and reports the outcome to the delegate.
    ///
    /// Exactly one `on_message_sent_result(success, callback_id)` is issued
    /// per call. Envelopes that cannot be handled report `false`.
    pub fn send_string_message(&self, message: &str, callback_id: i32) {
        let success = match self.dispatch(message) {
            Ok(success) => success,
            Err(e) => {
                tracing::debug!(
                    route_id = %self.identity.route_id,
                    code = e.code(),
                    error = %e,
                    "message not handled"
                );
                false
            }
        };
        self.delegate.on_message_sent_result(success, callback_id);
    }

    /// Decodes and handles a client envelope.
    ///
    /// Returns `Ok(success)` for a handled envelope and `Err` for one that is
    /// malformed or of an unsupported type.
    pub fn dispatch(&self, message: &str) -> ProtocolResult<bool> {
        let inbound = InboundMessage::parse(message)?;
        if let Some(client_id) = inbound.client_id() {
            tracing::debug!(route_id = %self.identity.route_id, client_id, "client message");
        }

        match inbound {
            InboundMessage::ClientConnect { client_id } => Ok(self.handle_client_connect(client_id)),
            InboundMessage::V2Message { client_id, message } => {
                self.handle_cast_v2_message(&client_id, &message)
            }
            InboundMessage::AppMessage { client_id, message } => {
                Ok(self.handle_app_message(&client_id, &message))
            }
            // parse() reports unsupported types as errors
            InboundMessage::Unsupported => Ok(false),
        }
    }

    fn handle_client_connect(&self, client_id: String) -> bool {
        let envelope = {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Closed {
                tracing::debug!(route_id = %self.identity.route_id, client_id = %client_id, "session closed, rejecting client");
                return false;
            }
            if inner.has_client(&client_id) {
                return false;
            }

            let snapshot = self.build_session_message(&inner);
            let envelope = RoutedEnvelope::new(
                OutboundType::NewSession,
                &snapshot,
                &client_id,
                SNAPSHOT_SEQUENCE_NUMBER,
            )
            .to_text();
            inner.clients.push(client_id);
            envelope
        };

        if let Some(envelope) = envelope {
            self.delegate.on_message(&self.identity.route_id, &envelope);
        }
        true
    }

    fn handle_cast_v2_message(&self, client_id: &str, payload: &CastV2Payload) -> ProtocolResult<bool> {
        if !self.inner.lock().has_client(client_id) {
            return Ok(false);
        }

        match payload.action()? {
            CastV2Action::Stop => {
                self.close();
                Ok(true)
            }
            CastV2Action::Media => Ok(self.send_cast_message(payload.to_json_string(), MEDIA_NAMESPACE)),
            CastV2Action::Ignore => {
                let message_type = payload.message_type()?;
                tracing::debug!(route_id = %self.identity.route_id, message_type, "ignoring v2 message");
                Ok(true)
            }
        }
    }

    fn handle_app_message(&self, client_id: &str, body: &AppMessageBody) -> bool {
        {
            let mut inner = self.inner.lock();
            if !inner.has_client(client_id) {
                return false;
            }
            if inner.session_id.as_deref() != Some(body.session_id.as_str()) {
                return false;
            }
            if body.namespace_name.is_empty() {
                return false;
            }
            if !inner.namespaces.contains(&body.namespace_name) {
                self.add_namespace(&mut inner, &body.namespace_name, true);
            }
        }

        // The page is not told about transport-level send failures.
        self.send_cast_message(body.message_text(), &body.namespace_name);
        true
    }

    /// Hands `message` to the transport on `namespace`.
    ///
    /// Returns `false` only if the transport is unusable. Send failures that
    /// surface later are logged.
    fn send_cast_message(&self, message: String, namespace: &str) -> bool {
        if !self.transport.is_usable() {
            return false;
        }

        let message = ensure_request_id(message);
        let transport = Arc::clone(&self.transport);
        let namespace = namespace.to_string();
        let route_id = self.identity.route_id.clone();
        self.spawner.spawn(Box::pin(async move {
            if let Err(e) = transport.send_message(&namespace, &message).await {
                tracing::warn!(
                    route_id = %route_id,
                    namespace = %namespace,
                    code = e.code(),
                    error = %e,
                    "exception while sending message"
                );
            }
        }));
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outbound (router → page)
    // ─────────────────────────────────────────────────────────────────────────

    /// Sends one session event to every client.
    ///
    /// `message` is embedded as JSON when it parses, as a string otherwise.
    /// The shared sequence counter advances by one per call.
    pub fn on_message(&self, kind: OutboundType, message: &str) {
        let payload = embed_payload(message);
        let outbox = self.inner.lock().broadcast(kind, &payload);
        self.deliver(outbox);
    }

    /// Wraps a receiver message from an application namespace in an
    /// `app_message` envelope and sends it to every client.
    pub fn on_app_message(&self, namespace: &str, message: &str) {
        let outbox = {
            let mut inner = self.inner.lock();
            let payload = json!({
                "sessionId": inner.session_id,
                "namespaceName": namespace,
                "message": message,
            });
            inner.broadcast(OutboundType::AppMessage, &payload)
        };
        self.deliver(outbox);
    }

    fn on_receiver_message(&self, namespace: &str, message: &str) {
        if namespace == MEDIA_NAMESPACE || namespace == RECEIVER_NAMESPACE {
            self.on_message(OutboundType::V2Message, message);
        } else {
            self.on_app_message(namespace, message);
        }
    }

    fn deliver(&self, outbox: Vec<String>) {
        for envelope in outbox {
            self.delegate.on_message(&self.identity.route_id, &envelope);
        }
    }

    /// Session snapshot for `new_session` / `update_session`.
    ///
    /// Degrades to `{}` when the transport cannot describe the receiver.
    fn build_session_message(&self, inner: &RouterInner) -> Value {
        if !self.transport.is_usable() {
            return empty_snapshot();
        }

        let receiver_state = self
            .transport
            .volume()
            .and_then(|volume| Ok((volume, self.transport.active_input_state()?)));
        let (volume, active_input) = match receiver_state {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(
                    route_id = %self.identity.route_id,
                    code = e.code(),
                    error = %e,
                    "building session message failed"
                );
                return empty_snapshot();
            }
        };

        let receiver = ReceiverSnapshot::new(
            self.sink.device_id.clone(),
            self.sink.friendly_name.clone(),
            self.sink.capability_names(),
            volume,
            active_input.as_i32(),
        );
        let metadata = inner.application_metadata.as_ref();
        SessionSnapshot::new(
            inner.session_id.clone(),
            metadata.map(|m| m.application_id.clone()),
            metadata.map(|m| m.name.clone()),
            inner.application_status.clone(),
            receiver,
            inner.namespaces.snapshot(),
        )
        .to_value()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Namespaces
    // ─────────────────────────────────────────────────────────────────────────

    fn register_platform_namespaces(&self) {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Open {
            return;
        }
        for namespace in [RECEIVER_NAMESPACE, MEDIA_NAMESPACE] {
            if !inner.namespaces.contains(namespace) {
                self.add_namespace(&mut inner, namespace, false);
            }
        }
    }

    /// Registers a receive callback for `namespace`.
    ///
    /// With `check_support`, namespaces the application metadata does not
    /// declare are skipped; unknown metadata registers anyway.
    fn add_namespace(&self, inner: &mut RouterInner, namespace: &str, check_support: bool) {
        debug_assert!(!inner.namespaces.contains(namespace));

        if !self.transport.is_usable() {
            tracing::debug!(route_id = %self.identity.route_id, namespace, "transport unavailable, namespace not registered");
            return;
        }

        if check_support {
            if let Some(metadata) = &inner.application_metadata {
                if !metadata.is_namespace_supported(namespace) {
                    tracing::debug!(route_id = %self.identity.route_id, namespace, "namespace not supported by application");
                    return;
                }
            }
        }

        let handler: Arc<dyn CastMessageHandler> = Arc::new(CastMessagingChannel {
            router: self.me.clone(),
        });
        match self.transport.set_message_received_callback(namespace, handler) {
            Ok(()) => inner.namespaces.insert(namespace),
            Err(e) => tracing::error!(
                route_id = %self.identity.route_id,
                namespace,
                code = e.code(),
                error = %e,
                "failed to register namespace listener"
            ),
        }
    }

    fn unregister_namespace(&self, namespace: &str) {
        if !self.transport.is_usable() {
            return;
        }

        if let Err(e) = self.transport.remove_message_received_callback(namespace) {
            tracing::error!(
                route_id = %self.identity.route_id,
                namespace,
                code = e.code(),
                error = %e,
                "failed to remove the namespace listener"
            );
        }
    }
}

impl RouteController for CastSessionRouter {
    fn close(&self) {
        CastSessionRouter::close(self);
    }

    fn send_string_message(&self, message: &str, callback_id: i32) {
        CastSessionRouter::send_string_message(self, message, callback_id);
    }

    fn source_id(&self) -> &str {
        self.identity.source.urn()
    }

    fn route_id(&self) -> &str {
        &self.identity.route_id
    }

    fn sink_id(&self) -> &str {
        &self.sink.device_id
    }

    fn origin(&self) -> &str {
        &self.identity.origin
    }

    fn tab_id(&self) -> i32 {
        self.identity.tab_id
    }

    fn mark_detached(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

/// Receive callback registered with the transport for each namespace.
///
/// Holds the router weakly; messages arriving after the router is dropped are
/// ignored.
struct CastMessagingChannel {
    router: Weak<CastSessionRouter>,
}

impl CastMessageHandler for CastMessagingChannel {
    fn on_message_received(&self, namespace: &str, message: &str) {
        if let Some(router) = self.router.upgrade() {
            router.on_receiver_message(namespace, message);
        }
    }
}
