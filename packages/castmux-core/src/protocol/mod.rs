//! Wire formats exchanged between the router and page-side clients.
//!
//! - `inbound` - Tagged envelopes sent by clients (`client_connect`,
//!   `v2_message`, `app_message`)
//! - `outbound` - Routed envelopes and session snapshots sent to clients

pub mod inbound;
pub mod outbound;

use thiserror::Error;

pub use inbound::{AppMessageBody, CastV2Action, CastV2Payload, InboundMessage};
pub use outbound::{
    embed_payload, ensure_request_id, EmbeddedPayload, OutboundType, ReceiverSnapshot, RoutedEnvelope,
    SessionSnapshot,
};

/// Errors raised while decoding an inbound envelope.
///
/// These never reach the page as anything other than a `false` send result;
/// the variants exist for logging and for callers of
/// [`CastSessionRouter::dispatch`](crate::services::CastSessionRouter::dispatch).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The envelope (or an embedded message) is not valid JSON of the expected shape.
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field the envelope type requires is absent or not a string.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The envelope `type` is not one the router handles.
    #[error("unsupported message type: {0}")]
    UnsupportedType(String),
}

/// Convenient Result alias for envelope decoding.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
