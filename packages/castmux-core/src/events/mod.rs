//! Route delegate callbacks and their typed event form.
//!
//! This module provides:
//! - [`RouteDelegate`] trait the router reports to
//! - [`ChannelRouteDelegate`] for async consumers (CLI, tests)
//! - [`RouteEvent`], the typed form of every delegate callback

mod bridge;
mod delegate;

pub use bridge::ChannelRouteDelegate;
pub use delegate::{LoggingRouteDelegate, NoopRouteDelegate, RouteDelegate};

use serde::Serialize;

/// One delegate callback, as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RouteEvent {
    /// A routed envelope addressed to one client of the route.
    #[serde(rename_all = "camelCase")]
    Message { route_id: String, message: String },

    /// Outcome of a `send_string_message` call.
    #[serde(rename_all = "camelCase")]
    MessageSentResult { success: bool, callback_id: i32 },

    /// The route's session has been torn down.
    #[serde(rename_all = "camelCase")]
    RouteClosed { route_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_event_serializes_with_event_tag() {
        let event = RouteEvent::MessageSentResult {
            success: true,
            callback_id: 4,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"messageSentResult","success":true,"callbackId":4}"#
        );

        let event = RouteEvent::RouteClosed {
            route_id: "r1".into(),
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"routeClosed","routeId":"r1"}"#
        );
    }
}
