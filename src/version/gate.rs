//! Per-call minimum version checks for version-aware handlers

use crate::version::api_version::ApiVersion;
use crate::version::error::VersionTooOld;

/// Reject the call when `caller` is older than `minimum`.
///
/// Handlers call this before doing any version-dependent work; the check
/// only affects the current call.
pub fn require_version(
    operation: &str,
    caller: &ApiVersion,
    minimum: &ApiVersion,
) -> Result<(), VersionTooOld> {
    if caller < minimum {
        return Err(VersionTooOld {
            operation: operation.to_string(),
            minimum: minimum.clone(),
            caller: caller.clone(),
        });
    }
    Ok(())
}
