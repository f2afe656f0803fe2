//! Castmux Core - Cast session multiplexing.
//!
//! This crate lets many page-level clients share one Cast application session
//! running on a receiver. It is designed to be embedded by a media router
//! (through [`RouteController`]) and is exercised standalone by the
//! `castmux-cli` replay tool.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`services`]: The session router and the route controller seam
//! - [`protocol`]: Client envelopes and session snapshots
//! - [`cast`]: Sink model, transport seam and a simulated transport
//! - [`events`]: Route delegate callbacks and their typed event form
//! - [`runtime`]: Task spawning abstraction for async runtime independence
//! - [`state`]: Session descriptor handed to the router
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The crate defines several traits to decouple routing logic from the
//! embedding platform:
//!
//! - [`CastTransport`](cast::CastTransport): The receiver channel
//! - [`RouteDelegate`](events::RouteDelegate): Where routed messages go
//! - [`TaskSpawner`](runtime::TaskSpawner): Running transport completions
//!
//! Each trait has implementations suitable for the CLI and for tests.

#![warn(clippy::all)]

pub mod cast;
pub mod error;
pub mod events;
pub mod protocol;
pub mod protocol_constants;
pub mod runtime;
pub mod services;
pub mod state;

// Re-export commonly used types at the crate root
pub use cast::{
    ActiveInputState, ApplicationMetadata, CastMessageHandler, CastSink, CastTransport,
    MediaSource, ReceiverVolume, SimulatedTransport, SinkCapability, TransportError,
};
pub use error::{CastmuxError, CastmuxResult, ErrorCode, ProtocolResult, TransportResult};
pub use events::{
    ChannelRouteDelegate, LoggingRouteDelegate, NoopRouteDelegate, RouteDelegate, RouteEvent,
};
pub use protocol::{OutboundType, ProtocolError};
pub use runtime::{InlineSpawner, TaskSpawner, TokioSpawner};
pub use services::{CastSessionRouter, RouteController, SessionState};
pub use state::SessionDescriptor;
