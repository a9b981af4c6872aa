//! Client-side helpers for plugins talking to the agent
//!
//! - [`resolver`]: Picks the first usable endpoint from preferred versions

pub mod resolver;

pub use resolver::{
    ConnectProbe, EndpointResolver, ReachabilityProbe, ResolveError, Selection,
    find_first_endpoint,
};
