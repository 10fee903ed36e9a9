//! Identity model for log signers
//!
//! Logs never handle private keys. A signer is referenced by an
//! [`Identity`] (stable id plus verifying key); the local peer holds a
//! [`Keypair`] that can sign entry bytes; and an [`IdentityAuthority`]
//! verifies signatures on entries received from anywhere.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use weft_core::{IdentityKey, Result};

use crate::signature::{
    sign, verify, verifying_key_from_identity_key, Ed25519Signature, Ed25519SigningKey,
};

/// A principal as referenced by logs and capability sets
///
/// The `id` is the human-facing identifier carried in denial diagnostics;
/// the `public_key` is the unit granted and revoked by the access layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier assigned by the issuing authority
    pub id: String,
    /// Hex-encoded Ed25519 verifying key
    pub public_key: IdentityKey,
}

impl Identity {
    /// The key this identity signs with
    pub fn key(&self) -> &IdentityKey {
        &self.public_key
    }
}

/// Local signing handle: an identity together with its private key
#[derive(Clone)]
pub struct Keypair {
    signing_key: Ed25519SigningKey,
    identity: Identity,
}

impl Keypair {
    /// Create a keypair from an existing signing key and identity
    pub fn new(signing_key: Ed25519SigningKey, identity: Identity) -> Self {
        Self {
            signing_key,
            identity,
        }
    }

    /// The identity this keypair signs as
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The public key of this keypair
    pub fn public_key(&self) -> &IdentityKey {
        &self.identity.public_key
    }

    /// Sign entry bytes
    pub fn sign(&self, data: &[u8]) -> Ed25519Signature {
        sign(&self.signing_key, data)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the private half.
        f.debug_struct("Keypair")
            .field("identity", &self.identity)
            .finish()
    }
}

/// External service that issues identities and verifies entry signatures
pub trait IdentityAuthority: Send + Sync {
    /// Verify that `signature` over `data` was produced by `identity`
    fn verify(&self, identity: &Identity, data: &[u8], signature: &Ed25519Signature)
        -> Result<()>;
}

/// Default authority: the identity id is the hex verifying key itself
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyAuthority;

impl KeyAuthority {
    /// Issue a fresh identity with a newly generated key
    pub fn issue(&self) -> Keypair {
        self.issue_from_key(Ed25519SigningKey::generate(&mut OsRng))
    }

    /// Issue an identity for an existing signing key
    pub fn issue_from_key(&self, signing_key: Ed25519SigningKey) -> Keypair {
        let public_key = IdentityKey::from_bytes(signing_key.verifying_key().as_bytes());
        let identity = Identity {
            id: public_key.as_str().to_string(),
            public_key,
        };
        Keypair::new(signing_key, identity)
    }
}

impl IdentityAuthority for KeyAuthority {
    fn verify(
        &self,
        identity: &Identity,
        data: &[u8],
        signature: &Ed25519Signature,
    ) -> Result<()> {
        let verifying_key = verifying_key_from_identity_key(&identity.public_key)?;
        verify(&verifying_key, data, signature)
    }
}
