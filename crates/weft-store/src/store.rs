//! Object store trait and typed block helpers

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use weft_core::{Cid, Result, WeftError};

/// Content-addressed block store
///
/// Blocks are JSON-shaped values addressed by the blake3 digest of their
/// canonical bytes. Stores are write-once: content never changes under an
/// identifier.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist a block and return its content identifier
    async fn put(&self, block: serde_json::Value) -> Result<Cid>;

    /// Fetch a block by identifier, `None` if unknown
    async fn get(&self, cid: &Cid) -> Result<Option<serde_json::Value>>;
}

/// Identifier of a block value, derived from its canonical bytes
pub(crate) fn block_cid(block: &serde_json::Value) -> Result<Cid> {
    let bytes = serde_json::to_vec(block)?;
    Ok(Cid::for_bytes(&bytes))
}

/// Serialize a value and persist it as a block
pub async fn put_block<T: Serialize>(store: &dyn ObjectStore, value: &T) -> Result<Cid> {
    let block = serde_json::to_value(value)?;
    store.put(block).await
}

/// Fetch a block and deserialize it into a typed value
pub async fn get_block<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    cid: &Cid,
) -> Result<Option<T>> {
    match store.get(cid).await? {
        Some(block) => {
            let value = serde_json::from_value(block)
                .map_err(|e| WeftError::serialization(format!("malformed block {}: {}", cid, e)))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
