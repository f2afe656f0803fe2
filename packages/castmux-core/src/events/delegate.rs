//! Delegate abstraction decoupling the router from whoever owns the route.
//!
//! The router depends on the [`RouteDelegate`] trait rather than on a concrete
//! media router, so it can be embedded anywhere that can accept three
//! callbacks.

/// Receives everything a route produces.
///
/// There is exactly one delegate per router. Callbacks are invoked without
/// any router lock held, so a delegate may call back into the router.
///
/// # Example
///
/// ```ignore
/// let router = CastSessionRouter::new(descriptor, transport, delegate, spawner);
/// router.send_string_message(r#"{"type":"client_connect","clientId":"c1"}"#, 1);
/// // delegate.on_message("route-1", "{\"type\":\"new_session\",...}")
/// // delegate.on_message_sent_result(true, 1)
/// ```
pub trait RouteDelegate: Send + Sync {
    /// Delivers a routed envelope (already serialized) for `route_id`.
    fn on_message(&self, route_id: &str, message: &str);

    /// Reports the outcome of a `send_string_message` call.
    fn on_message_sent_result(&self, success: bool, callback_id: i32);

    /// Reports that the session behind `route_id` is gone.
    fn on_route_closed(&self, route_id: &str);
}

/// Delegate that drops every callback.
pub struct NoopRouteDelegate;

impl RouteDelegate for NoopRouteDelegate {
    fn on_message(&self, _route_id: &str, _message: &str) {}

    fn on_message_sent_result(&self, _success: bool, _callback_id: i32) {}

    fn on_route_closed(&self, _route_id: &str) {}
}

/// Delegate that logs every callback at debug level.
pub struct LoggingRouteDelegate;

impl RouteDelegate for LoggingRouteDelegate {
    fn on_message(&self, route_id: &str, message: &str) {
        tracing::debug!(route_id, message, "route_message");
    }

    fn on_message_sent_result(&self, success: bool, callback_id: i32) {
        tracing::debug!(success, callback_id, "route_message_sent_result");
    }

    fn on_route_closed(&self, route_id: &str) {
        tracing::debug!(route_id, "route_closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test delegate that counts callbacks.
    struct CountingRouteDelegate {
        messages: AtomicUsize,
        results: AtomicUsize,
        closed: AtomicUsize,
    }

    impl RouteDelegate for CountingRouteDelegate {
        fn on_message(&self, _route_id: &str, _message: &str) {
            self.messages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_message_sent_result(&self, _success: bool, _callback_id: i32) {
            self.results.fetch_add(1, Ordering::SeqCst);
        }

        fn on_route_closed(&self, _route_id: &str) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn delegates_are_usable_as_trait_objects() {
        let counting = Arc::new(CountingRouteDelegate {
            messages: AtomicUsize::new(0),
            results: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        });
        let delegates: Vec<Arc<dyn RouteDelegate>> = vec![
            Arc::new(NoopRouteDelegate),
            Arc::new(LoggingRouteDelegate),
            counting.clone(),
        ];

        for delegate in &delegates {
            delegate.on_message("r1", "{}");
            delegate.on_message_sent_result(true, 1);
            delegate.on_route_closed("r1");
        }

        assert_eq!(counting.messages.load(Ordering::SeqCst), 1);
        assert_eq!(counting.results.load(Ordering::SeqCst), 1);
        assert_eq!(counting.closed.load(Ordering::SeqCst), 1);
    }
}
