//! Backend trait for the document store.
//!
//! Defines the interface that all document storage backends must implement,
//! enabling pluggable storage (redb, memory, a hosted document database, etc.).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Builds the flat storage key for a document: `<collection>/<id>`.
///
/// Collection names never contain `/`, so a collection prefix only ever
/// matches documents of that collection even when ids contain slashes.
pub(crate) fn doc_key(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

/// Prefix shared by every key of a collection.
pub(crate) fn collection_prefix(collection: &str) -> String {
    format!("{collection}/")
}

/// Shallow-merges `patch` into `doc`.
///
/// Top-level fields in `patch` overwrite fields in `doc`; everything else is
/// left untouched. A non-object `doc` is replaced by the patch.
pub(crate) fn merge_patch(doc: &mut Value, patch: Map<String, Value>) {
    match doc {
        Value::Object(fields) => {
            for (key, value) in patch {
                fields.insert(key, value);
            }
        },
        other => *other = Value::Object(patch),
    }
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Create or overwrite a document.
    Set {
        collection: String,
        id: String,
        doc: Value,
    },
    /// Remove a document (no-op if absent).
    Delete { collection: String, id: String },
}

/// Ordered set of writes applied atomically by [`DocumentBackend::commit`].
///
/// Readers observe either none or all of the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a create-or-overwrite.
    pub fn set(&mut self, collection: &str, id: &str, doc: Value) -> &mut Self {
        self.ops.push(BatchOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            doc,
        });
        self
    }

    /// Queues a delete.
    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.ops.push(BatchOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the batch, yielding its writes in insertion order.
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Backend trait for JSON document storage.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Documents are addressed by `(collection, id)` and hold arbitrary JSON.
///
/// # Example
///
/// ```ignore
/// use folio::store::{DocumentBackend, MemoryBackend};
///
/// let backend = MemoryBackend::new();
/// backend.set("images", "img-1", serde_json::json!({"url": "..."})).await?;
/// let doc = backend.get("images", "img-1").await?;
/// ```
#[async_trait]
pub trait DocumentBackend: Send + Sync + 'static {
    /// Retrieves a document.
    ///
    /// Returns `Ok(None)` if the document doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Creates or overwrites a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Deletes a document.
    ///
    /// Returns `Ok(true)` if the document existed and was removed,
    /// `Ok(false)` if it didn't exist. Idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// Lists every document in a collection as `(id, document)` pairs,
    /// ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>>;

    /// Applies every write in `batch` atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails, in which
    /// case none of the writes are visible.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Shallow-merges `patch` into an existing document.
    ///
    /// Returns `Ok(false)` without writing if the document doesn't exist.
    /// The default implementation is a read followed by a write; backends
    /// with transactions should override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        let Some(mut doc) = self.get(collection, id).await? else {
            return Ok(false);
        };
        merge_patch(&mut doc, patch);
        self.set(collection, id, doc).await?;
        Ok(true)
    }

    /// Retrieves several documents, preserving the order of `ids`.
    ///
    /// Missing documents yield `None` in their slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Option<Value>>> {
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            docs.push(self.get(collection, id).await?);
        }
        Ok(docs)
    }
}
