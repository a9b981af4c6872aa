//! Built-in `agent` group
//!
//! Describes the agent itself, so a plugin can check what it is talking to
//! before relying on any privileged group.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rpc::{CallContext, RpcError, RpcServer};
use crate::server::group::ApiGroupVersion;
use crate::version::{ApiVersion, require_version};

pub const GROUP: &str = "agent";

/// Versions of the `agent` group served by this build, oldest first
pub const VERSIONS: &[&str] = &["v1alpha1", "v1"];

/// Result of `GetInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub name: String,
    pub agent_version: String,
    pub api_version: ApiVersion,
}

/// One entry of `ListGroups`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    pub version: ApiVersion,
}

/// Entries for the `agent` group at every supported version.
///
/// `catalog` is what `ListGroups` reports; it should describe everything the
/// aggregator serves, including these entries.
pub fn group_versions(catalog: Arc<Vec<GroupSummary>>) -> Vec<ApiGroupVersion> {
    VERSIONS
        .iter()
        .map(|version| {
            let catalog = catalog.clone();
            ApiGroupVersion::new(GROUP, ApiVersion::must(version), move |server: &mut RpcServer| {
                register(server, catalog.clone())
            })
        })
        .collect()
}

/// Summaries of `entries`, for use as the `ListGroups` catalog
pub fn catalog(entries: &[(&str, ApiVersion)]) -> Vec<GroupSummary> {
    entries
        .iter()
        .map(|(group, version)| GroupSummary {
            group: group.to_string(),
            version: version.clone(),
        })
        .collect()
}

fn register(server: &mut RpcServer, catalog: Arc<Vec<GroupSummary>>) {
    server.handle("GetInfo", |ctx: Arc<CallContext>, _: ()| async move {
        Ok::<_, RpcError>(AgentInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
            api_version: ctx.version.clone(),
        })
    });

    server.handle("ListGroups", move |ctx: Arc<CallContext>, _: ()| {
        let catalog = catalog.clone();
        async move {
            require_version("ListGroups", &ctx.version, &ApiVersion::must("v1"))?;
            Ok::<_, RpcError>(catalog.as_ref().clone())
        }
    });
}
