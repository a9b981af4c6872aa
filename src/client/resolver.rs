//! Client-side endpoint discovery
//!
//! Callers pass their acceptable versions in preference order (usually newest
//! compatible first); the resolver returns the address of the first one that
//! the probe selects.

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::debug;

use crate::ipc::{EndpointNamespace, endpoint_reachable};
use crate::version::ApiVersion;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No reachable endpoint for {group} among [{}]", .candidates.join(", "))]
    NoReachableEndpoint {
        group: String,
        candidates: Vec<String>,
    },
}

/// Decides whether an endpoint address is currently reachable
#[cfg_attr(test, automock)]
pub trait ReachabilityProbe: Send + Sync {
    fn is_reachable(&self, address: &str) -> bool;
}

/// Treats an endpoint as reachable when a server accepts a connection on it
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectProbe;

impl ReachabilityProbe for ConnectProbe {
    fn is_reachable(&self, address: &str) -> bool {
        endpoint_reachable(address)
    }
}

/// Which candidate the resolver settles on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// The first candidate whose endpoint is reachable
    #[default]
    FirstReachable,
    /// The first candidate whose endpoint is *not* reachable. Matches the
    /// behavior of older clients; kept only for compatibility.
    FirstUnreachable,
}

pub struct EndpointResolver<P: ReachabilityProbe = ConnectProbe> {
    namespace: EndpointNamespace,
    probe: P,
    selection: Selection,
}

impl EndpointResolver {
    pub fn new(namespace: EndpointNamespace) -> Self {
        Self::with_probe(namespace, ConnectProbe)
    }
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(EndpointNamespace::default())
    }
}

impl<P: ReachabilityProbe> EndpointResolver<P> {
    pub fn with_probe(namespace: EndpointNamespace, probe: P) -> Self {
        Self {
            namespace,
            probe,
            selection: Selection::default(),
        }
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Address of the first candidate version the selection accepts
    pub fn find_first_endpoint(
        &self,
        group: &str,
        candidates: &[ApiVersion],
    ) -> Result<String, ResolveError> {
        let want_reachable = self.selection == Selection::FirstReachable;

        for version in candidates {
            let address = self.namespace.address(group, version);
            let reachable = self.probe.is_reachable(&address);
            debug!("Probed {}: reachable={}", address, reachable);
            if reachable == want_reachable {
                return Ok(address);
            }
        }

        Err(ResolveError::NoReachableEndpoint {
            group: group.to_string(),
            candidates: candidates.iter().map(ToString::to_string).collect(),
        })
    }
}

/// [`EndpointResolver::find_first_endpoint`] in the default namespace
pub fn find_first_endpoint(group: &str, candidates: &[ApiVersion]) -> Result<String, ResolveError> {
    EndpointResolver::default().find_first_endpoint(group, candidates)
}
