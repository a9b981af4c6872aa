//! Local inter-process transport
//!
//! # Modules
//!
//! - [`address`]: Deterministic endpoint address per (group, version)
//! - [`listener`]: Server side listeners (Unix domain sockets / named pipes)
//! - [`stream`]: Client side connections and endpoint liveness checks

pub mod address;
pub mod listener;
pub mod stream;

pub use address::{EndpointNamespace, address};
pub use listener::{Binder, IpcBinder, IpcListener, Listener};
pub use stream::{connect, endpoint_reachable};
