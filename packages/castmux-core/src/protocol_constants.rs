//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the Cast v2 protocol and by the page-side
//! client library that consumes routed envelopes. Changing them would break
//! compatibility with existing senders and receivers.

// ─────────────────────────────────────────────────────────────────────────────
// Cast Namespaces
// ─────────────────────────────────────────────────────────────────────────────

/// Namespace of the platform receiver (application lifecycle, device volume).
pub const RECEIVER_NAMESPACE: &str = "urn:x-cast:com.google.cast.receiver";

/// Namespace of the default media channel.
pub const MEDIA_NAMESPACE: &str = "urn:x-cast:com.google.cast.media";

// ─────────────────────────────────────────────────────────────────────────────
// Cast V2 Message Types
// ─────────────────────────────────────────────────────────────────────────────

/// Embedded `v2_message` type that stops the receiver application.
pub const STOP_MESSAGE_TYPE: &str = "STOP";

/// Embedded `v2_message` types forwarded verbatim on [`MEDIA_NAMESPACE`].
pub const MEDIA_MESSAGE_TYPES: [&str; 13] = [
    "PLAY",
    "LOAD",
    "PAUSE",
    "SEEK",
    "GET_STATUS",
    "STOP_MEDIA",
    "SET_VOLUME",
    "EDIT_TRACKS_INFO",
    "QUEUE_LOAD",
    "QUEUE_INSERT",
    "QUEUE_UPDATE",
    "QUEUE_REMOVE",
    "QUEUE_REORDER",
];

/// Field the receiver uses to correlate requests with responses.
pub const REQUEST_ID_FIELD: &str = "requestId";

/// Request id injected into outgoing messages that omit one.
pub const DEFAULT_REQUEST_ID: i64 = 0;

// ─────────────────────────────────────────────────────────────────────────────
// Routed Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Sequence number carried by session snapshots (`new_session`, `update_session`).
///
/// Snapshots are addressed to one client and are not part of the shared
/// event sequence, so they never consume a counter value.
pub const SNAPSHOT_SEQUENCE_NUMBER: i32 = -1;

/// Timeout carried by every outbound envelope.
///
/// The router never waits for acknowledgements; timeouts belong to the page.
pub const ENVELOPE_TIMEOUT_MILLIS: u32 = 0;

// ─────────────────────────────────────────────────────────────────────────────
// Session Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Receiver type reported in session snapshots.
pub const RECEIVER_TYPE: &str = "cast";

/// Session status reported in session snapshots.
pub const SESSION_STATUS_CONNECTED: &str = "connected";

/// Transport id the page-side library expects for mirrored sessions.
pub const TRANSPORT_ID: &str = "web-4";
