//! Signed, content-addressed log entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use weft_core::{EntryId, IdentityKey, Result};
use weft_crypto::{Ed25519Signature, Identity, Keypair};

/// A signed, hash-linked log entry
///
/// Entries are immutable once created. The `id` is the blake3 digest of the
/// canonical JSON encoding of payload, parents, identity, and signature, so
/// any in-flight alteration is detectable by recomputing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Content hash of the canonical encoding
    pub id: EntryId,
    /// Application payload
    pub payload: T,
    /// Causal predecessors: the log heads at append time
    pub parents: BTreeSet<EntryId>,
    /// Identity of the signer
    pub identity: Identity,
    /// Signature over payload, parents, and signer key
    pub signature: Ed25519Signature,
}

// The signature covers everything except itself and the derived id.
#[derive(Serialize)]
struct SignedView<'a, T> {
    payload: &'a T,
    parents: &'a BTreeSet<EntryId>,
    key: &'a IdentityKey,
}

#[derive(Serialize)]
struct HashedView<'a, T> {
    payload: &'a T,
    parents: &'a BTreeSet<EntryId>,
    identity: &'a Identity,
    signature: &'a Ed25519Signature,
}

fn signed_bytes<T: Serialize>(
    payload: &T,
    parents: &BTreeSet<EntryId>,
    key: &IdentityKey,
) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&SignedView {
        payload,
        parents,
        key,
    })?)
}

fn content_id<T: Serialize>(
    payload: &T,
    parents: &BTreeSet<EntryId>,
    identity: &Identity,
    signature: &Ed25519Signature,
) -> Result<EntryId> {
    let bytes = serde_json::to_vec(&HashedView {
        payload,
        parents,
        identity,
        signature,
    })?;
    Ok(EntryId::for_bytes(&bytes))
}

impl<T: Serialize> Entry<T> {
    /// Create and sign an entry linked to the given predecessors
    pub fn create(payload: T, parents: BTreeSet<EntryId>, signer: &Keypair) -> Result<Self> {
        let bytes = signed_bytes(&payload, &parents, signer.public_key())?;
        let signature = signer.sign(&bytes);
        let identity = signer.identity().clone();
        let id = content_id(&payload, &parents, &identity, &signature)?;
        Ok(Self {
            id,
            payload,
            parents,
            identity,
            signature,
        })
    }

    /// Reassemble an entry from parts received off the wire
    ///
    /// The id is derived from the parts; signature validity is the
    /// receiving log's concern.
    pub fn from_parts(
        payload: T,
        parents: BTreeSet<EntryId>,
        identity: Identity,
        signature: Ed25519Signature,
    ) -> Result<Self> {
        let id = content_id(&payload, &parents, &identity, &signature)?;
        Ok(Self {
            id,
            payload,
            parents,
            identity,
            signature,
        })
    }

    /// The bytes covered by this entry's signature
    pub fn signed_bytes(&self) -> Result<Vec<u8>> {
        signed_bytes(&self.payload, &self.parents, self.identity.key())
    }

    /// Whether the stored id matches the entry content
    pub fn id_matches_content(&self) -> Result<bool> {
        let id = content_id(&self.payload, &self.parents, &self.identity, &self.signature)?;
        Ok(id == self.id)
    }
}
