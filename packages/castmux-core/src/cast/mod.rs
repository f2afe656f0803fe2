//! Cast sink model and transport seam.
//!
//! # Module Structure
//!
//! - `types` - Sink, application metadata and media source types
//! - `traits` - [`CastTransport`] and [`CastMessageHandler`] abstractions
//! - `simulated` - In-memory transport for replay tooling and tests

pub mod simulated;
pub mod traits;
pub mod types;

pub use simulated::SimulatedTransport;
pub use traits::{CastMessageHandler, CastTransport, TransportError, TransportResult};
pub use types::{
    ActiveInputState, ApplicationMetadata, CastSink, MediaSource, ReceiverVolume, SinkCapability,
};
