//! Privileged host agent serving versioned operation groups over local IPC
//!
//! Each operation group is served at every API version it supports, one
//! endpoint per (group, version). Plugins pick the newest version they
//! understand that the agent is serving, and version-aware handlers reject
//! callers below an operation's minimum version.
//!
//! # Modules
//!
//! - [`version`]: API version identifiers and the per-call version gate
//! - [`ipc`]: Endpoint addressing and the local transport
//! - [`rpc`]: Wire messages, per-endpoint server and client
//! - [`server`]: The aggregator running all endpoints together
//! - [`client`]: Endpoint discovery for callers
//! - [`config`]: Agent configuration and constants
//! - [`logging`]: Tracing subscriber setup

pub mod client;
pub mod config;
pub mod ipc;
pub mod logging;
pub mod rpc;
pub mod server;
pub mod version;
