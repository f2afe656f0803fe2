//! The seam a media router uses to drive any kind of route.

/// Operations a media router performs on an established route.
///
/// Implemented by [`CastSessionRouter`](super::CastSessionRouter); other route
/// kinds (e.g. presentation-only routes) implement it the same way.
pub trait RouteController: Send + Sync {
    /// Tears the route down. Idempotent.
    fn close(&self);

    /// Handles a message from the page. The outcome is reported through the
    /// route delegate under `callback_id`.
    fn send_string_message(&self, message: &str, callback_id: i32);

    /// URN of the media source the route was created for.
    fn source_id(&self) -> &str;

    fn route_id(&self) -> &str;

    fn sink_id(&self) -> &str;

    /// Origin of the frame that requested the route.
    fn origin(&self) -> &str;

    fn tab_id(&self) -> i32;

    /// Remembers that the frame which created the route has gone away.
    fn mark_detached(&self);

    fn is_detached(&self) -> bool;
}
