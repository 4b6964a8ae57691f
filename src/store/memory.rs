//! In-memory document storage backend.
//!
//! Provides a fast, non-persistent document store guarded by a single
//! `parking_lot` lock so that batches are applied atomically. Ideal for
//! testing, development, and embedded use cases.

use super::backend::{BatchOp, DocumentBackend, WriteBatch, collection_prefix, doc_key, merge_patch};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// In-memory document storage backend.
///
/// All data is lost when the process exits.
///
/// # Thread Safety
///
/// `MemoryBackend` is `Clone`; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents across all collections.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Returns true if the store is empty.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Clears all documents from the store.
    #[cfg(test)]
    pub fn clear(&self) {
        self.docs.write().clear();
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self.docs.read().get(&doc_key(collection, id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        self.docs.write().insert(doc_key(collection, id), doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.docs.write().remove(&doc_key(collection, id)).is_some())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let prefix = collection_prefix(collection);
        let docs = self.docs.read();

        let entries = docs
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, doc)| (key[prefix.len()..].to_string(), doc.clone()))
            .collect();

        Ok(entries)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut docs = self.docs.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { collection, id, doc } => {
                    docs.insert(doc_key(&collection, &id), doc);
                },
                BatchOp::Delete { collection, id } => {
                    docs.remove(&doc_key(&collection, &id));
                },
            }
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        let mut docs = self.docs.write();
        match docs.get_mut(&doc_key(collection, id)) {
            Some(doc) => {
                merge_patch(doc, patch);
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_set() {
        let backend = MemoryBackend::new();

        backend.set("images", "a", json!({"url": "u"})).await.unwrap();
        let doc = backend.get("images", "a").await.unwrap();
        assert_eq!(doc, Some(json!({"url": "u"})));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let backend = MemoryBackend::new();

        backend.set("images", "a", json!(1)).await.unwrap();
        backend.set("images-archive", "b", json!(2)).await.unwrap();

        let listed = backend.list("images").await.unwrap();
        assert_eq!(listed, vec![("a".to_string(), json!(1))]);
        assert!(backend.get("categories", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_with_slashes() {
        let backend = MemoryBackend::new();

        backend.set("categories", "travel/japan", json!({})).await.unwrap();
        let listed = backend.list("categories").await.unwrap();
        assert_eq!(listed[0].0, "travel/japan");
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let backend = MemoryBackend::new();
        let mut patch = Map::new();
        patch.insert("alt".into(), json!("x"));

        assert!(!backend.update("images", "nope", patch).await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let backend = MemoryBackend::new();
        backend.set("images", "a", json!(1)).await.unwrap();
        assert_eq!(backend.len(), 1);

        backend.clear();
        assert!(backend.is_empty());
    }
}
