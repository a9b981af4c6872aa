use thiserror::Error;

use crate::version::api_version::ApiVersion;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("malformed version {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },
}

/// A call arrived on an endpoint older than the operation supports
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} requires API version {minimum} or newer, caller negotiated {caller}")]
pub struct VersionTooOld {
    pub operation: String,
    pub minimum: ApiVersion,
    pub caller: ApiVersion,
}
