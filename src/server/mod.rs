//! Multi-endpoint server aggregation
//!
//! # Modules
//!
//! - [`aggregator`]: Opens one endpoint per (group, version) and runs them together
//! - [`group`]: Registered group/version pairs and the registrant callback
//! - [`agent`]: Built-in group describing the agent itself
//! - [`error`]: Startup, serving and shutdown errors

pub mod agent;
pub mod aggregator;
pub mod error;
pub mod group;

pub use aggregator::{AggregatorState, ServerAggregator};
pub use error::{EndpointError, ListenError, StartError, StopError};
pub use group::{ApiGroupVersion, Registrant};
