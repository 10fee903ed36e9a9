//! Persisted controller and governance manifests
//!
//! Manifests are JSON-shaped, write-once blocks in the object store. A
//! governed log's own manifest points at the controller manifest, which
//! points at the governance log's address; resolving that address yields
//! the governance manifest carrying the replay seed.

use serde::{Deserialize, Serialize};

use weft_core::{Cid, IdentityKey, LogAddress, Result, WeftError};

/// Type tag of the built-in log-backed controller
pub const CONTROLLER_TYPE: &str = "orbitdb";

/// Persisted descriptor of an access controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerManifest {
    /// Controller type tag, dispatched through the registry
    #[serde(rename = "type")]
    pub controller_type: String,
    /// Type-specific parameters
    pub params: ControllerParams,
}

/// Parameters of the log-backed controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerParams {
    /// Address of the governance log
    pub address: LogAddress,
}

impl ControllerManifest {
    /// Manifest for a log-backed controller at the given governance address
    pub fn orbitdb(address: LogAddress) -> Self {
        Self {
            controller_type: CONTROLLER_TYPE.to_string(),
            params: ControllerParams { address },
        }
    }
}

/// Persisted descriptor of a governance log
///
/// Lives at the root cid of the governance log's address. Carrying the
/// creator key here is what lets every peer reconstruct the same replay
/// seed without any out-of-band exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceManifest {
    /// Path name of the governance log, ending in the `_access` segment
    pub name: String,
    /// Key of the creator seeded into both capability sets
    pub creator: IdentityKey,
}

/// Object-store path for a persisted manifest
pub fn manifest_path(cid: &Cid) -> String {
    format!("/ipfs/{}", cid)
}

/// Parse an object-store manifest path back to its cid
pub fn parse_manifest_path(path: &str) -> Result<Cid> {
    let rest = path.strip_prefix("/ipfs/").ok_or_else(|| {
        WeftError::invalid(format!("manifest path must start with /ipfs/: {}", path))
    })?;
    rest.parse()
}
