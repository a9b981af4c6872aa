//! API version identifiers
//!
//! Versions follow the grammar `v<major>[alpha<n>|beta<n>]`:
//! - `v1`: stable
//! - `v2alpha7`: seventh alpha of major 2
//! - `v1beta3`: third beta of major 1
//!
//! Ordering is major first, then `alpha < beta < stable`, then the
//! qualifier version compared numerically (`v2alpha98 > v2alpha97`).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::error::VersionError;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v([0-9]+)(?:(alpha|beta)([0-9]*))?$").unwrap());

/// Prerelease marker of an [`ApiVersion`]
///
/// Variant order is the comparison rank, so the derived `Ord` compares the
/// rank first and the prerelease number second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Alpha(NonZeroU32),
    Beta(NonZeroU32),
    Stable,
}

impl Qualifier {
    /// Keyword as it appears in a version string (empty for stable)
    pub fn keyword(&self) -> &'static str {
        match self {
            Qualifier::Alpha(_) => "alpha",
            Qualifier::Beta(_) => "beta",
            Qualifier::Stable => "",
        }
    }

    /// Prerelease number, 0 for stable
    pub fn number(&self) -> u32 {
        match self {
            Qualifier::Alpha(n) | Qualifier::Beta(n) => n.get(),
            Qualifier::Stable => 0,
        }
    }
}

/// A parsed API version such as `v1beta2`
#[derive(Debug, Clone)]
pub struct ApiVersion {
    major: u32,
    qualifier: Qualifier,
    raw: String,
}

impl ApiVersion {
    /// Build a version from its parts; `raw` is the canonical rendering
    pub fn new(major: NonZeroU32, qualifier: Qualifier) -> Self {
        let mut version = Self {
            major: major.get(),
            qualifier,
            raw: String::new(),
        };
        version.raw = version.to_string();
        version
    }

    /// Parse a version string, rejecting anything that is not a full match
    /// of the version grammar.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let malformed = |reason: &'static str| VersionError::Malformed {
            input: input.to_string(),
            reason,
        };

        let caps = VERSION_RE
            .captures(input)
            .ok_or_else(|| malformed("expected v<major>[alpha<n>|beta<n>]"))?;

        let major: u32 = caps[1]
            .parse()
            .map_err(|_| malformed("major version is out of range"))?;
        if major == 0 {
            return Err(malformed("major version must be at least 1"));
        }

        let qualifier = match caps.get(2) {
            None => Qualifier::Stable,
            Some(keyword) => {
                let digits = &caps[3];
                if digits.is_empty() {
                    return Err(malformed("qualifier requires a version number"));
                }
                let number: u32 = digits
                    .parse()
                    .map_err(|_| malformed("qualifier version is out of range"))?;
                let number = NonZeroU32::new(number)
                    .ok_or_else(|| malformed("qualifier version must be at least 1"))?;
                match keyword.as_str() {
                    "alpha" => Qualifier::Alpha(number),
                    _ => Qualifier::Beta(number),
                }
            }
        };

        Ok(Self {
            major,
            qualifier,
            raw: input.to_string(),
        })
    }

    /// Parse a version literal known at compile time.
    ///
    /// # Panics
    /// Panics if `input` is not a valid version. Never call this with user input.
    pub fn must(input: &str) -> Self {
        match Self::parse(input) {
            Ok(version) => version,
            Err(e) => panic!("invalid version literal: {e}"),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn is_stable(&self) -> bool {
        self.qualifier == Qualifier::Stable
    }

    /// The exact string this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.major)?;
        match self.qualifier {
            Qualifier::Stable => Ok(()),
            q => write!(f, "{}{}", q.keyword(), q.number()),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// `raw` is diagnostic only: `v01` and `v1` are the same version.
impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.qualifier == other.qualifier
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.qualifier.hash(state);
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ApiVersion::parse(&raw).map_err(serde::de::Error::custom)
    }
}
