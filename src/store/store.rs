//! High-level `DocStore` wrapper over backend implementations.
//!
//! Adds typed (serde) accessors on top of the raw JSON backend API.

use super::backend::{DocumentBackend, WriteBatch};
use super::memory::MemoryBackend;
use super::redb::RedbBackend;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// High-level document store interface.
///
/// Wraps a `DocumentBackend` implementation and provides a consistent API
/// regardless of the underlying storage mechanism.
///
/// # Thread Safety
///
/// `DocStore` is `Clone` and can be shared across threads. The underlying
/// backend handles concurrent access safely.
///
/// # Example
///
/// ```ignore
/// use folio::store::DocStore;
///
/// let store = DocStore::memory();
/// store.put("images", "img-1", &image).await?;
/// let image: Option<Image> = store.get_as("images", "img-1").await?;
/// ```
#[derive(Clone)]
pub struct DocStore {
    backend: Arc<dyn DocumentBackend>,
}

impl DocStore {
    /// Creates a new `DocStore` backed by a file-based redb database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let backend = RedbBackend::open(path)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Creates a new `DocStore` backed by an in-memory store.
    ///
    /// All data is lost when the process exits.
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    /// Creates a new `DocStore` with a custom backend.
    pub fn custom<B: DocumentBackend>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Retrieves a raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.backend.get(collection, id).await
    }

    /// Retrieves and deserializes a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or the stored
    /// document does not match `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        self.backend
            .get(collection, id)
            .await?
            .map(|doc| {
                serde_json::from_value(doc)
                    .with_context(|| format!("Malformed document '{collection}/{id}'"))
            })
            .transpose()
    }

    /// Retrieves and deserializes several documents, preserving the order
    /// of `ids`. Missing documents yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or a stored document
    /// does not match `T`.
    pub async fn get_many_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Option<T>>> {
        let docs = self.backend.get_many(collection, ids).await?;
        docs.into_iter()
            .zip(ids)
            .map(|(doc, id)| {
                doc.map(|doc| {
                    serde_json::from_value(doc)
                        .with_context(|| format!("Malformed document '{collection}/{id}'"))
                })
                .transpose()
            })
            .collect()
    }

    /// Serializes and stores a document, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage operation fails.
    pub async fn put<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let doc = serde_json::to_value(doc)
            .with_context(|| format!("Failed to serialize document '{collection}/{id}'"))?;
        self.backend.set(collection, id, doc).await
    }

    /// Shallow-merges `patch` into an existing document.
    ///
    /// Returns `Ok(false)` if the document doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        self.backend.update(collection, id, patch).await
    }

    /// Deletes a document.
    ///
    /// Returns `Ok(true)` if the document existed, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.backend.delete(collection, id).await
    }

    /// Checks if a document exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.backend.get(collection, id).await?.is_some())
    }

    /// Lists and deserializes every document in a collection as
    /// `(id, document)` pairs ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or a stored document
    /// does not match `T`.
    pub async fn list_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, T)>> {
        self.backend
            .list(collection)
            .await?
            .into_iter()
            .map(|(id, doc)| {
                let doc = serde_json::from_value(doc)
                    .with_context(|| format!("Malformed document '{collection}/{id}'"))?;
                Ok((id, doc))
            })
            .collect()
    }

    /// Applies a batch of writes atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    pub async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.backend.commit(batch).await
    }
}
