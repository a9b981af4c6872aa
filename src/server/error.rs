use std::io;

use thiserror::Error;

use crate::rpc::ServeError;
use crate::version::ApiVersion;

/// A listener could not be opened or released during startup
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("Failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to close {address}: {source}")]
    Close {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// A serving task ended with an error
#[derive(Debug, Error)]
#[error("{group} {version}: {source}")]
pub struct EndpointError {
    pub group: String,
    pub version: ApiVersion,
    #[source]
    pub source: ServeError,
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Server aggregator was already started")]
    AlreadyStarted,

    #[error("Failed to open endpoints: {}", join(.0))]
    Listen(Vec<ListenError>),

    #[error("Endpoints stopped with errors: {}", join(.0))]
    Serve(Vec<EndpointError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StopError {
    #[error("Server aggregator has not been started")]
    NotStarted,
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
