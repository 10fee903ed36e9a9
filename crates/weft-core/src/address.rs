//! Log addresses
//!
//! A log is addressed by a path-shaped string rooted at the content
//! identifier of its persisted manifest: `/orbitdb/<cid>/<path>`. The
//! governance log of an access controller uses the reserved final path
//! segment `_access`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::WeftError;
use crate::identifiers::Cid;

/// Scheme prefix shared by every log address
pub const ADDRESS_PREFIX: &str = "/orbitdb";

/// Reserved final path segment of a governance log address
pub const GOVERNANCE_SUFFIX: &str = "_access";

/// Address of a replicated log: manifest cid plus a slash-separated path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogAddress {
    root: Cid,
    path: String,
}

impl LogAddress {
    /// Create an address from a manifest cid and a path
    pub fn new(root: Cid, path: impl Into<String>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    /// Create the governance address for a named log
    ///
    /// The path is `<name>/_access`, so the final segment is always the
    /// reserved governance token.
    pub fn governance(root: Cid, name: &str) -> Self {
        Self {
            root,
            path: format!("{}/{}", name, GOVERNANCE_SUFFIX),
        }
    }

    /// The manifest cid the address is rooted at
    pub fn root(&self) -> &Cid {
        &self.root
    }

    /// The slash-separated path component
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this address names a governance log
    pub fn is_governance(&self) -> bool {
        self.path.rsplit('/').next() == Some(GOVERNANCE_SUFFIX)
    }

    /// Parse an address from its string form
    pub fn parse(s: &str) -> Result<Self, WeftError> {
        let rest = s.strip_prefix(ADDRESS_PREFIX).ok_or_else(|| {
            WeftError::invalid(format!("log address must start with {}: {}", ADDRESS_PREFIX, s))
        })?;
        let rest = rest.strip_prefix('/').ok_or_else(|| {
            WeftError::invalid(format!("malformed log address: {}", s))
        })?;
        let (root, path) = rest
            .split_once('/')
            .ok_or_else(|| WeftError::invalid(format!("log address missing path: {}", s)))?;
        if path.is_empty() {
            return Err(WeftError::invalid(format!("log address missing path: {}", s)));
        }
        Ok(Self {
            root: root.parse()?,
            path: path.to_string(),
        })
    }
}

impl fmt::Display for LogAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", ADDRESS_PREFIX, self.root, self.path)
    }
}

impl FromStr for LogAddress {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Addresses are persisted inside manifests as plain strings.
impl Serialize for LogAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
