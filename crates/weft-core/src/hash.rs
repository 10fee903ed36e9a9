//! Content hashing primitives
//!
//! Weft addresses every persisted block and log entry by the blake3 digest
//! of its canonical encoding. `Hash32` is the raw digest; the identifier
//! newtypes in [`crate::identifiers`] wrap it with domain meaning.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::WeftError;

/// 32-byte blake3 digest used for content addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    /// Create a hash from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash arbitrary data with blake3
    pub fn digest(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hash from its hex encoding
    pub fn from_hex(s: &str) -> Result<Self, WeftError> {
        let bytes = hex::decode(s)
            .map_err(|e| WeftError::invalid(format!("invalid hash hex: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WeftError::invalid("invalid hash length: expected 32 bytes"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Hash32 {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Hashes appear inside JSON-shaped manifests and entry blocks, so they
// serialize as hex strings rather than byte arrays.
impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = Hash32::digest(b"hello");
        let b = Hash32::digest(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, Hash32::digest(b"world"));
    }

    #[test]
    fn test_hex_round_trip() {
        let hash = Hash32::digest(b"round trip");
        let restored = Hash32::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, restored);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Hash32::from_hex("not hex").is_err());
        assert!(Hash32::from_hex("abcd").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = Hash32::digest(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: Hash32 = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }
}
