//! Remote calls over IPC endpoints
//!
//! Messages are newline-delimited JSON objects: a request carries an id, a
//! method name and params; the response echoes the id with either a result
//! or an error object.
//!
//! # Modules
//!
//! - [`message`]: Request, response and error payloads
//! - [`server`]: Per-endpoint server with its method table and stop handle
//! - [`client`]: Connection to one endpoint
//! - [`error`]: Call, serve and client errors

pub mod client;
pub mod error;
pub mod message;
pub mod server;

pub use client::RpcClient;
pub use error::{ClientError, RpcError, ServeError};
pub use server::{CallContext, Handler, RpcServer, StopHandle};
