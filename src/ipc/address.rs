//! Endpoint addressing
//!
//! Maps an operation group and API version to the host IPC address its
//! server listens on: `<prefix>host-proxy-<group>-<version>`. A rendered
//! version never contains `-`, so the last `-` always separates group from
//! version and distinct pairs never share an address.

use std::path::Path;

use crate::config::{DEFAULT_ENDPOINT_PREFIX, ENDPOINT_TAG};
use crate::version::ApiVersion;

/// The reserved prefix endpoint addresses are created under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointNamespace {
    prefix: String,
}

impl EndpointNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Namespace rooted in a filesystem directory (Unix domain sockets)
    pub fn in_dir(dir: &Path) -> Self {
        let mut prefix = dir.to_string_lossy().into_owned();
        if !prefix.ends_with(std::path::MAIN_SEPARATOR) {
            prefix.push(std::path::MAIN_SEPARATOR);
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Address of the endpoint serving `group` at `version`
    pub fn address(&self, group: &str, version: &ApiVersion) -> String {
        format!("{}{}{}-{}", self.prefix, ENDPOINT_TAG, group, version)
    }
}

impl Default for EndpointNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT_PREFIX)
    }
}

/// Address of the endpoint serving `group` at `version` in the default namespace
pub fn address(group: &str, version: &ApiVersion) -> String {
    EndpointNamespace::default().address(group, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("volume", "v1beta1", "host-proxy-volume-v1beta1")]
    #[case("disk", "v1", "host-proxy-disk-v1")]
    #[case("smb", "v2alpha3", "host-proxy-smb-v2alpha3")]
    fn address_joins_prefix_tag_group_and_version(
        #[case] group: &str,
        #[case] version: &str,
        #[case] suffix: &str,
    ) {
        let ns = EndpointNamespace::new("/run/");
        assert_eq!(
            ns.address(group, &ApiVersion::must(version)),
            format!("/run/{suffix}")
        );
    }

    #[test]
    fn address_uses_canonical_version_form() {
        let ns = EndpointNamespace::new("/run/");
        let parsed = ApiVersion::must("v01beta001");

        assert_eq!(ns.address("volume", &parsed), "/run/host-proxy-volume-v1beta1");
    }

    #[test]
    fn default_address_uses_default_prefix() {
        let version = ApiVersion::must("v1");
        assert_eq!(
            address("disk", &version),
            format!("{DEFAULT_ENDPOINT_PREFIX}host-proxy-disk-v1")
        );
    }

    #[test]
    fn in_dir_appends_separator() {
        let ns = EndpointNamespace::in_dir(Path::new("/tmp/sockets"));
        let expected = format!("/tmp/sockets{}", std::path::MAIN_SEPARATOR);
        assert_eq!(ns.prefix(), expected);
    }

    #[test]
    fn distinct_pairs_never_collide() {
        let ns = EndpointNamespace::default();
        let groups = ["disk", "disk-v1", "volume", "vol", "v1"];
        let versions = ["v1", "v1alpha1", "v1beta1", "v2", "v12"];

        let mut seen = HashSet::new();
        for group in groups {
            for version in versions {
                let addr = ns.address(group, &ApiVersion::must(version));
                assert!(seen.insert(addr.clone()), "duplicate address {addr}");
            }
        }
    }
}
