//! Route services layer.
//!
//! This module contains the session router that sits between page-side
//! clients (via [`RouteDelegate`](crate::events::RouteDelegate)) and the Cast
//! transport (via [`CastTransport`](crate::cast::CastTransport)).

pub(crate) mod namespace_registry;
pub mod route_controller;
pub mod session_router;

pub use route_controller::RouteController;
pub use session_router::{CastSessionRouter, SessionState};
