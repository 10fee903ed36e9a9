//! In-memory object store

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use weft_core::{Cid, Result};

use crate::store::{block_cid, ObjectStore};

/// In-process content-addressed store
///
/// Cloning shares the underlying block map, so one `MemoryStore` can stand
/// in for the shared store of several in-process peers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: Arc<RwLock<BTreeMap<Cid, serde_json::Value>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Whether the store holds no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, block: serde_json::Value) -> Result<Cid> {
        let cid = block_cid(&block)?;
        let mut blocks = self.blocks.write();
        // Write-once: identical content already sits under this cid.
        blocks.entry(cid).or_insert(block);
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> Result<Option<serde_json::Value>> {
        Ok(self.blocks.read().get(cid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        let cid = store.put(json!({"a": 1})).await.unwrap();
        let block = store.get(&cid).await.unwrap();
        assert_eq!(block, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_identical_content_same_cid() {
        let store = MemoryStore::new();
        let a = store.put(json!({"k": "v"})).await.unwrap();
        let b = store.put(json!({"k": "v"})).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = MemoryStore::new();
        let cid = Cid::for_bytes(b"never stored");
        assert_eq!(store.get(&cid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clone_shares_blocks() {
        let store = MemoryStore::new();
        let peer_view = store.clone();
        let cid = store.put(json!("shared")).await.unwrap();
        assert_eq!(peer_view.get(&cid).await.unwrap(), Some(json!("shared")));
    }
}
