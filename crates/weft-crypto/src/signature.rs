//! Digital signature wrappers for Ed25519 operations
//!
//! Provides the small signing surface the log layer needs, with signatures
//! carried in hex so they embed directly in JSON-shaped entry blocks.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use weft_core::{IdentityKey, Result, WeftError};

/// Ed25519 signing key
pub type Ed25519SigningKey = SigningKey;

/// Ed25519 verifying key (public key)
pub type Ed25519VerifyingKey = VerifyingKey;

/// Ed25519 signature, hex-encoded when serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub Signature);

impl Ed25519Signature {
    /// Signature bytes
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Hex encoding of the signature
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse a signature from its hex encoding
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| WeftError::crypto(format!("invalid signature hex: {}", e)))?;
        let bytes: [u8; 64] = bytes
            .try_into()
            .map_err(|_| WeftError::crypto("invalid signature length: expected 64 bytes"))?;
        Ok(Self(Signature::from_bytes(&bytes)))
    }
}

impl fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Signature> for Ed25519Signature {
    fn from(sig: Signature) -> Self {
        Self(sig)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Sign data with Ed25519
pub fn sign(signing_key: &Ed25519SigningKey, data: &[u8]) -> Ed25519Signature {
    Ed25519Signature(signing_key.sign(data))
}

/// Verify an Ed25519 signature
pub fn verify(
    verifying_key: &Ed25519VerifyingKey,
    data: &[u8],
    signature: &Ed25519Signature,
) -> Result<()> {
    verifying_key
        .verify(data, &signature.0)
        .map_err(|e| WeftError::crypto(format!("signature verification failed: {}", e)))
}

/// Decode a verifying key from its identity-key hex form
pub fn verifying_key_from_identity_key(key: &IdentityKey) -> Result<Ed25519VerifyingKey> {
    let bytes = key.to_bytes()?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| WeftError::crypto("invalid verifying key length: expected 32 bytes"))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| WeftError::crypto(format!("invalid verifying key: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_verify() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        let data = b"hello world";
        let signature = sign(&signing_key, data);

        assert!(verify(&verifying_key, data, &signature).is_ok());
        assert!(verify(&verifying_key, b"wrong data", &signature).is_err());
    }

    #[test]
    fn test_signature_hex_round_trip() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let signature = sign(&signing_key, b"round trip");

        let restored = Ed25519Signature::from_hex(&signature.to_hex()).unwrap();
        assert_eq!(signature, restored);
    }

    #[test]
    fn test_signature_serde_as_hex() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let signature = sign(&signing_key, b"serde");

        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(json, format!("\"{}\"", signature.to_hex()));
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(signature, back);
    }

    #[test]
    fn test_verifying_key_from_identity_key() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        let identity_key = IdentityKey::from_bytes(verifying_key.as_bytes());

        let restored = verifying_key_from_identity_key(&identity_key).unwrap();
        assert_eq!(verifying_key, restored);

        assert!(verifying_key_from_identity_key(&IdentityKey::new("zz")).is_err());
    }
}
