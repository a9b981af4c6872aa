use std::io;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

use crate::rpc::message::{ErrorCode, ErrorObject};
use crate::version::VersionTooOld;

/// Failure of a single call, sent back to the caller as an error response
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    VersionTooOld(#[from] VersionTooOld),

    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            RpcError::InvalidParams(_) => ErrorCode::InvalidParams,
            RpcError::VersionTooOld(_) => ErrorCode::VersionTooOld,
            RpcError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn to_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::InvalidParams(e.to_string())
    }
}

/// Why a server stopped serving on its own
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Accept failed on {address}: {source}")]
    Accept {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Serving task panicked: {0}")]
    Panicked(String),

    #[error("Serving task exited without reporting")]
    Vanished,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Framing error: {0}")]
    Frame(#[from] LinesCodecError),

    #[error("Connection closed before a response arrived")]
    Closed,

    #[error("Response id {got} does not match request id {expected}")]
    IdMismatch { expected: u64, got: u64 },

    #[error("{method} failed ({code:?}): {message}")]
    Remote {
        method: String,
        code: ErrorCode,
        message: String,
    },
}
