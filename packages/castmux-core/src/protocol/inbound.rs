//! Envelopes received from page-side clients.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use super::{ProtocolError, ProtocolResult};
use crate::protocol_constants::{MEDIA_MESSAGE_TYPES, STOP_MESSAGE_TYPE};

/// Incoming client envelope, decoded once at the boundary.
///
/// Fields other than the ones listed (`sequenceNumber`, `timeoutMillis`, ...)
/// are accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// A page instance announces itself.
    #[serde(rename = "client_connect")]
    ClientConnect {
        #[serde(rename = "clientId")]
        client_id: String,
    },
    /// A Cast v2 platform message (media commands, `STOP`).
    #[serde(rename = "v2_message")]
    V2Message {
        #[serde(rename = "clientId")]
        client_id: String,
        message: CastV2Payload,
    },
    /// A message for an application-defined namespace.
    #[serde(rename = "app_message")]
    AppMessage {
        #[serde(rename = "clientId")]
        client_id: String,
        message: AppMessageBody,
    },
    #[serde(other)]
    Unsupported,
}

impl InboundMessage {
    /// Parses an envelope from its text form.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Malformed`] if the text is not JSON or a known
    ///   envelope lacks its required fields
    /// - [`ProtocolError::MissingField`] if there is no string `type`
    /// - [`ProtocolError::UnsupportedType`] for any other `type`
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("type"))?
            .to_string();

        match Self::deserialize(value)? {
            Self::Unsupported => Err(ProtocolError::UnsupportedType(kind)),
            Self::V2Message {
                client_id,
                mut message,
            } => {
                let envelope: RawEnvelope<'_> = serde_json::from_str(text)?;
                message.raw = Some(envelope.message.get().to_string());
                Ok(Self::V2Message { client_id, message })
            }
            message => Ok(message),
        }
    }

    /// Id of the client that sent the envelope, if any.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::ClientConnect { client_id }
            | Self::V2Message { client_id, .. }
            | Self::AppMessage { client_id, .. } => Some(client_id),
            Self::Unsupported => None,
        }
    }
}

/// Borrowed view of an envelope's embedded message, byte for byte.
#[derive(Deserialize)]
struct RawEnvelope<'a> {
    #[serde(borrow)]
    message: &'a RawValue,
}

/// What the router does with an embedded Cast v2 message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastV2Action {
    /// Stop the receiver application and close the session.
    Stop,
    /// Forward verbatim on the media namespace.
    Media,
    /// Accepted but not acted upon.
    Ignore,
}

/// The object embedded in a `v2_message` envelope.
///
/// Envelopes decoded by [`InboundMessage::parse`] keep the original text of
/// the object, which is what gets forwarded to the receiver.
#[derive(Debug, Clone, Deserialize)]
pub struct CastV2Payload {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip)]
    raw: Option<String>,
}

impl CastV2Payload {
    /// The embedded `type` (e.g. `LOAD`).
    pub fn message_type(&self) -> ProtocolResult<&str> {
        self.fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("message.type"))
    }

    pub fn action(&self) -> ProtocolResult<CastV2Action> {
        let message_type = self.message_type()?;
        let action = if message_type == STOP_MESSAGE_TYPE {
            CastV2Action::Stop
        } else if MEDIA_MESSAGE_TYPES.contains(&message_type) {
            CastV2Action::Media
        } else {
            CastV2Action::Ignore
        };
        Ok(action)
    }

    /// The embedded object as text for the transport.
    pub fn to_json_string(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => Value::Object(self.fields.clone()).to_string(),
        }
    }
}

/// The object embedded in an `app_message` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMessageBody {
    /// Session the page believes it is talking to.
    pub session_id: String,
    /// Application namespace to send on.
    pub namespace_name: String,
    /// Application payload. Usually a string; other JSON is sent serialized.
    pub message: Value,
}

impl AppMessageBody {
    /// The payload as the text handed to the transport.
    pub fn message_text(&self) -> String {
        match &self.message {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_connect() {
        let message = InboundMessage::parse(r#"{"type":"client_connect","clientId":"c1"}"#).unwrap();
        assert!(matches!(message, InboundMessage::ClientConnect { ref client_id } if client_id == "c1"));
        assert_eq!(message.client_id(), Some("c1"));
    }

    #[test]
    fn ignores_envelope_bookkeeping_fields() {
        let message = InboundMessage::parse(
            r#"{"type":"v2_message","message":{"type":"PLAY"},"sequenceNumber":3,"timeoutMillis":0,"clientId":"c1"}"#,
        )
        .unwrap();
        match message {
            InboundMessage::V2Message { client_id, message } => {
                assert_eq!(client_id, "c1");
                assert_eq!(message.action().unwrap(), CastV2Action::Media);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn v2_message_keeps_original_text() {
        let message = InboundMessage::parse(
            r#"{"type":"v2_message","clientId":"c1","message":{"type":"SEEK","mediaSessionId":1, "currentTime":12345678901234567890123}}"#,
        )
        .unwrap();
        match message {
            InboundMessage::V2Message { message, .. } => assert_eq!(
                message.to_json_string(),
                r#"{"type":"SEEK","mediaSessionId":1, "currentTime":12345678901234567890123}"#
            ),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = InboundMessage::parse(r#"{"type":"leave_session","clientId":"c1"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedType(ref t) if t == "leave_session"));
    }

    #[test]
    fn missing_type_is_reported() {
        let err = InboundMessage::parse(r#"{"clientId":"c1"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("type")));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = InboundMessage::parse("{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn known_type_without_client_id_is_malformed() {
        let err = InboundMessage::parse(r#"{"type":"client_connect"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn v2_actions_cover_stop_media_and_other() {
        let stop: CastV2Payload = serde_json::from_str(r#"{"type":"STOP"}"#).unwrap();
        let seek: CastV2Payload = serde_json::from_str(r#"{"type":"SEEK","currentTime":4}"#).unwrap();
        let launch: CastV2Payload = serde_json::from_str(r#"{"type":"LAUNCH"}"#).unwrap();
        let untyped: CastV2Payload = serde_json::from_str(r#"{"volume":1}"#).unwrap();

        assert_eq!(stop.action().unwrap(), CastV2Action::Stop);
        assert_eq!(seek.action().unwrap(), CastV2Action::Media);
        assert_eq!(launch.action().unwrap(), CastV2Action::Ignore);
        assert!(matches!(
            untyped.action(),
            Err(ProtocolError::MissingField("message.type"))
        ));
    }

    #[test]
    fn every_media_command_is_forwarded() {
        for message_type in MEDIA_MESSAGE_TYPES {
            let payload: CastV2Payload =
                serde_json::from_value(serde_json::json!({ "type": message_type })).unwrap();
            assert_eq!(payload.action().unwrap(), CastV2Action::Media, "{message_type}");
        }
    }

    #[test]
    fn app_message_text_keeps_strings_and_serializes_objects() {
        let body: AppMessageBody = serde_json::from_str(
            r#"{"sessionId":"s1","namespaceName":"urn:x-cast:com.example","message":"hello"}"#,
        )
        .unwrap();
        assert_eq!(body.message_text(), "hello");

        let body: AppMessageBody = serde_json::from_str(
            r#"{"sessionId":"s1","namespaceName":"urn:x-cast:com.example","message":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(body.message_text(), r#"{"a":1}"#);
    }
}
