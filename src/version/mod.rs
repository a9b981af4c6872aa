//! API versioning
//!
//! Every operation group is served at one or more API versions. This module
//! provides the version identifier itself and the per-call gate that
//! version-aware handlers use to reject callers below an operation's minimum.
//!
//! # Modules
//!
//! - [`api_version`]: Parsing, ordering and rendering of `v1`, `v1beta2`, ...
//! - [`gate`]: Minimum version checks for request handlers
//! - [`error`]: Version parse and gating errors

pub mod api_version;
pub mod error;
pub mod gate;

pub use api_version::{ApiVersion, Qualifier};
pub use error::{VersionError, VersionTooOld};
pub use gate::require_version;
