//! Envelopes and payloads sent to page-side clients.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::cast::ReceiverVolume;
use crate::protocol_constants::{
    DEFAULT_REQUEST_ID, ENVELOPE_TIMEOUT_MILLIS, RECEIVER_TYPE, REQUEST_ID_FIELD,
    SESSION_STATUS_CONNECTED, TRANSPORT_ID,
};

/// Type tag of an outbound envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutboundType {
    #[serde(rename = "new_session")]
    NewSession,
    #[serde(rename = "update_session")]
    UpdateSession,
    #[serde(rename = "remove_session")]
    RemoveSession,
    #[serde(rename = "app_message")]
    AppMessage,
    #[serde(rename = "v2_message")]
    V2Message,
}

impl OutboundType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewSession => "new_session",
            Self::UpdateSession => "update_session",
            Self::RemoveSession => "remove_session",
            Self::AppMessage => "app_message",
            Self::V2Message => "v2_message",
        }
    }
}

/// Envelope addressed to a single client.
///
/// Serializes as
/// `{"type", "message", "sequenceNumber", "timeoutMillis": 0, "clientId"}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEnvelope<'a, M: ?Sized = Value> {
    #[serde(rename = "type")]
    pub kind: OutboundType,
    pub message: &'a M,
    pub sequence_number: i32,
    pub timeout_millis: u32,
    pub client_id: &'a str,
}

impl<'a, M: Serialize + ?Sized> RoutedEnvelope<'a, M> {
    pub fn new(
        kind: OutboundType,
        message: &'a M,
        client_id: &'a str,
        sequence_number: i32,
    ) -> Self {
        Self {
            kind,
            message,
            sequence_number,
            timeout_millis: ENVELOPE_TIMEOUT_MILLIS,
            client_id,
        }
    }

    /// Serializes the envelope to its text form.
    pub fn to_text(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(kind = self.kind.as_str(), error = %e, "failed to serialize envelope");
                None
            }
        }
    }
}

/// Payload text as embedded in an envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmbeddedPayload {
    /// Valid JSON, embedded byte for byte.
    Json(Box<RawValue>),
    /// Anything else, embedded as a JSON string.
    Text(String),
}

/// Converts payload text into what is embedded in an envelope.
///
/// Valid JSON is embedded as-is (objects stay objects, `"\"s1\""` becomes the
/// string `s1`); anything else is embedded as a JSON string.
pub fn embed_payload(text: &str) -> EmbeddedPayload {
    match RawValue::from_string(text.to_string()) {
        Ok(raw) => EmbeddedPayload::Json(raw),
        Err(_) => EmbeddedPayload::Text(text.to_string()),
    }
}

/// Makes sure an outgoing Cast message carries a `requestId`.
///
/// Messages that already mention `requestId` are returned untouched. JSON
/// objects without it get `requestId: 0`. Anything that cannot be tagged is
/// returned unchanged so it is still sent.
pub fn ensure_request_id(message: String) -> String {
    if message.contains(&format!("\"{REQUEST_ID_FIELD}\"")) {
        return message;
    }

    match serde_json::from_str::<Value>(&message) {
        // Appended as text; the page's key order is kept.
        Ok(Value::Object(object)) => {
            let separator = if object.is_empty() { "" } else { "," };
            message
                .trim_end()
                .strip_suffix('}')
                .map(|body| format!("{body}{separator}\"{REQUEST_ID_FIELD}\":{DEFAULT_REQUEST_ID}}}"))
                .unwrap_or(message)
        }
        Ok(_) => {
            tracing::warn!("Cast message is not a JSON object, sending without requestId");
            message
        }
        Err(_) => {
            tracing::warn!("Cast message is not valid JSON, sending without requestId");
            message
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Namespace entry of a session snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceEntry {
    pub name: String,
}

/// Receiver description embedded in a session snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverSnapshot {
    /// Device id of the sink.
    pub label: String,
    pub friendly_name: String,
    pub capabilities: Vec<&'static str>,
    pub volume: ReceiverVolume,
    pub is_active_input: i32,
    /// Always `null`.
    pub display_status: Option<Value>,
    pub receiver_type: &'static str,
}

/// Payload of `new_session` and `update_session` envelopes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub app_id: Option<String>,
    pub display_name: Option<String>,
    pub status_text: String,
    pub receiver: ReceiverSnapshot,
    pub namespaces: Vec<NamespaceEntry>,
    pub media: Vec<Value>,
    pub status: &'static str,
    pub transport_id: &'static str,
}

impl SessionSnapshot {
    pub fn new(
        session_id: Option<String>,
        app_id: Option<String>,
        display_name: Option<String>,
        status_text: String,
        receiver: ReceiverSnapshot,
        namespaces: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            session_id,
            app_id,
            display_name,
            status_text,
            receiver,
            namespaces: namespaces
                .into_iter()
                .map(|name| NamespaceEntry { name })
                .collect(),
            media: Vec::new(),
            status: SESSION_STATUS_CONNECTED,
            transport_id: TRANSPORT_ID,
        }
    }

    /// Snapshot as an embeddable value; `{}` if serialization fails.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "building session message failed");
            empty_snapshot()
        })
    }
}

impl ReceiverSnapshot {
    pub fn new(
        label: String,
        friendly_name: String,
        capabilities: Vec<&'static str>,
        volume: ReceiverVolume,
        is_active_input: i32,
    ) -> Self {
        Self {
            label,
            friendly_name,
            capabilities,
            volume,
            is_active_input,
            display_status: None,
            receiver_type: RECEIVER_TYPE,
        }
    }
}

/// The degraded snapshot sent when the session state cannot be read.
pub fn empty_snapshot() -> Value {
    Value::Object(serde_json::Map::new())
}
