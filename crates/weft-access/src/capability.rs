//! Capability types and the derived capability snapshot

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use weft_core::{IdentityKey, WeftError};

/// Named permission held by zero or more identities
///
/// The set is closed: `admin` gates the governance log itself, `write`
/// gates the governed data log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// May append capability changes to the governance log
    Admin,
    /// May append entries to the governed log
    Write,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Write => write!(f, "write"),
        }
    }
}

impl FromStr for Capability {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "write" => Ok(Self::Write),
            other => Err(WeftError::invalid(format!("unknown capability: {}", other))),
        }
    }
}

/// Direction of a capability change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityOpKind {
    /// Add the subject to the capability's holder set
    Grant,
    /// Remove the subject from the capability's holder set
    Revoke,
}

/// Payload of a governance log entry
///
/// Immutable once appended; revocation is a new entry, never removal of
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityOp {
    /// Grant or revoke
    pub op: CapabilityOpKind,
    /// Capability being changed
    pub capability: Capability,
    /// Key of the identity the change applies to
    pub subject: IdentityKey,
}

impl CapabilityOp {
    /// Create a grant operation
    pub fn grant(capability: Capability, subject: IdentityKey) -> Self {
        Self {
            op: CapabilityOpKind::Grant,
            capability,
            subject,
        }
    }

    /// Create a revoke operation
    pub fn revoke(capability: Capability, subject: IdentityKey) -> Self {
        Self {
            op: CapabilityOpKind::Revoke,
            capability,
            subject,
        }
    }
}

/// Mapping from capability to the set of identity keys holding it
///
/// Strictly derived state: always equal to the replay of the governance log
/// from its seed. Instances are immutable snapshots, replaced wholesale on
/// recomputation, so concurrent readers never observe a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    grants: BTreeMap<Capability, BTreeSet<IdentityKey>>,
}

impl CapabilitySet {
    /// The seed state: the creator holds both capabilities
    ///
    /// The seed is implicit, not a change entry, and cannot be replayed
    /// away.
    pub fn seed(creator: &IdentityKey) -> Self {
        let mut grants = BTreeMap::new();
        grants.insert(Capability::Admin, BTreeSet::from([creator.clone()]));
        grants.insert(Capability::Write, BTreeSet::from([creator.clone()]));
        Self { grants }
    }

    /// Whether `key` holds `capability`
    pub fn contains(&self, capability: Capability, key: &IdentityKey) -> bool {
        self.grants
            .get(&capability)
            .is_some_and(|holders| holders.contains(key))
    }

    /// The holders of a capability
    pub fn holders(&self, capability: Capability) -> BTreeSet<IdentityKey> {
        self.grants.get(&capability).cloned().unwrap_or_default()
    }

    /// Apply one change operation in place
    pub fn apply(&mut self, op: &CapabilityOp) {
        let holders = self.grants.entry(op.capability).or_default();
        match op.op {
            CapabilityOpKind::Grant => {
                holders.insert(op.subject.clone());
            }
            CapabilityOpKind::Revoke => {
                holders.remove(&op.subject);
            }
        }
    }

    /// Whether no identity holds `admin` any more
    ///
    /// A frozen governance log accepts no further changes; this state is
    /// permanent and intentional.
    pub fn is_frozen(&self) -> bool {
        self.grants
            .get(&Capability::Admin)
            .map_or(true, |holders| holders.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(label: &str) -> IdentityKey {
        IdentityKey::new(label)
    }

    #[test]
    fn test_seed_holds_both_capabilities() {
        let creator = key("creator");
        let set = CapabilitySet::seed(&creator);
        assert!(set.contains(Capability::Admin, &creator));
        assert!(set.contains(Capability::Write, &creator));
        assert!(!set.is_frozen());
    }

    #[test]
    fn test_grant_then_revoke() {
        let creator = key("creator");
        let friend = key("friend");
        let mut set = CapabilitySet::seed(&creator);

        set.apply(&CapabilityOp::grant(Capability::Write, friend.clone()));
        assert!(set.contains(Capability::Write, &friend));
        assert!(!set.contains(Capability::Admin, &friend));

        set.apply(&CapabilityOp::revoke(Capability::Write, friend.clone()));
        assert!(!set.contains(Capability::Write, &friend));
    }

    #[test]
    fn test_revoking_last_admin_freezes() {
        let creator = key("creator");
        let mut set = CapabilitySet::seed(&creator);
        set.apply(&CapabilityOp::revoke(Capability::Admin, creator.clone()));
        assert!(set.is_frozen());
        // Write holders are untouched by the freeze.
        assert!(set.contains(Capability::Write, &creator));
    }

    #[test]
    fn test_capability_serde_tags() {
        assert_eq!(
            serde_json::to_string(&Capability::Admin).unwrap(),
            "\"admin\""
        );
        assert_eq!(
            serde_json::to_string(&Capability::Write).unwrap(),
            "\"write\""
        );
        assert_eq!("write".parse::<Capability>().unwrap(), Capability::Write);
        assert!("owner".parse::<Capability>().is_err());
    }
}
