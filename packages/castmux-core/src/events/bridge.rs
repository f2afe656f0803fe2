//! Bridge implementation that maps delegate callbacks onto a channel.
//!
//! The [`ChannelRouteDelegate`] lives at the boundary between the router and
//! async consumers, turning each callback into a [`RouteEvent`].

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::delegate::RouteDelegate;
use super::RouteEvent;

/// Forwards every delegate callback into an unbounded mpsc channel.
///
/// An optional inner delegate (set after construction) is invoked first, so a
/// consumer can both observe events and keep a platform delegate informed.
#[derive(Clone)]
pub struct ChannelRouteDelegate {
    tx: mpsc::UnboundedSender<RouteEvent>,
    /// Optional delegate receiving the same callbacks
    inner: Arc<RwLock<Option<Arc<dyn RouteDelegate>>>>,
}

impl ChannelRouteDelegate {
    /// Creates the delegate and the receiving half of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RouteEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let delegate = Self {
            tx,
            inner: Arc::new(RwLock::new(None)),
        };
        (delegate, rx)
    }

    /// Sets a delegate that is called before each event is queued.
    pub fn set_inner_delegate(&self, delegate: Arc<dyn RouteDelegate>) {
        *self.inner.write() = Some(delegate);
    }

    fn send(&self, event: RouteEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::trace!(event = ?e.0, "route event receiver dropped");
        }
    }
}

impl RouteDelegate for ChannelRouteDelegate {
    fn on_message(&self, route_id: &str, message: &str) {
        if let Some(ref delegate) = *self.inner.read() {
            delegate.on_message(route_id, message);
        }
        self.send(RouteEvent::Message {
            route_id: route_id.to_string(),
            message: message.to_string(),
        });
    }

    fn on_message_sent_result(&self, success: bool, callback_id: i32) {
        if let Some(ref delegate) = *self.inner.read() {
            delegate.on_message_sent_result(success, callback_id);
        }
        self.send(RouteEvent::MessageSentResult {
            success,
            callback_id,
        });
    }

    fn on_route_closed(&self, route_id: &str) {
        if let Some(ref delegate) = *self.inner.read() {
            delegate.on_route_closed(route_id);
        }
        self.send(RouteEvent::RouteClosed {
            route_id: route_id.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LoggingRouteDelegate;

    #[test]
    fn callbacks_arrive_in_order() {
        let (delegate, mut rx) = ChannelRouteDelegate::new();
        delegate.set_inner_delegate(Arc::new(LoggingRouteDelegate));

        delegate.on_message("r1", "{}");
        delegate.on_message_sent_result(false, 9);
        delegate.on_route_closed("r1");

        assert_eq!(
            rx.try_recv().unwrap(),
            RouteEvent::Message {
                route_id: "r1".into(),
                message: "{}".into()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RouteEvent::MessageSentResult {
                success: false,
                callback_id: 9
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RouteEvent::RouteClosed {
                route_id: "r1".into()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (delegate, rx) = ChannelRouteDelegate::new();
        drop(rx);
        delegate.on_route_closed("r1");
    }
}
