//! Core identifier types used across the weft workspace
//!
//! These newtypes keep the different hash-shaped identifiers from being
//! mixed up: a [`Cid`] addresses a block in the object store, an
//! [`EntryId`] names a log entry by its content hash, and an
//! [`IdentityKey`] names a principal by its hex-encoded public key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::WeftError;
use crate::hash::Hash32;

/// Content identifier for a block in the object store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cid(pub Hash32);

impl Cid {
    /// Derive the content identifier for a block of bytes
    pub fn for_bytes(data: &[u8]) -> Self {
        Self(Hash32::digest(data))
    }

    /// Get the underlying digest
    pub fn hash(&self) -> &Hash32 {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cid {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Hash32::from_hex(s)?))
    }
}

/// Identifier of a log entry: the content hash of its canonical encoding
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntryId(pub Hash32);

impl EntryId {
    /// Derive the entry identifier for canonical entry bytes
    pub fn for_bytes(data: &[u8]) -> Self {
        Self(Hash32::digest(data))
    }

    /// Get the underlying digest
    pub fn hash(&self) -> &Hash32 {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Hash32::from_hex(s)?))
    }
}

/// Hex-encoded Ed25519 verifying key identifying a principal
///
/// This is the unit stored in capability sets and written into manifests.
/// The key is kept in its hex form so persisted JSON and denial diagnostics
/// render it directly.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap an already hex-encoded key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key from raw verifying-key bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The hex encoding of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the key back to raw bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, WeftError> {
        hex::decode(&self.0)
            .map_err(|e| WeftError::invalid(format!("invalid identity key hex: {}", e)))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_display_round_trip() {
        let cid = Cid::for_bytes(b"block");
        let parsed: Cid = cid.to_string().parse().unwrap();
        assert_eq!(cid, parsed);
    }

    #[test]
    fn test_identity_key_bytes_round_trip() {
        let key = IdentityKey::from_bytes(&[7u8; 32]);
        assert_eq!(key.to_bytes().unwrap(), vec![7u8; 32]);
    }

    #[test]
    fn test_identity_key_serde_is_transparent() {
        let key = IdentityKey::new("abcd");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"abcd\"");
    }
}
