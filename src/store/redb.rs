//! Redb-backed document storage backend.
//!
//! Provides persistent document storage using redb with ACID guarantees.
//! Documents are stored as JSON bytes under `<collection>/<id>` keys.

use super::backend::{BatchOp, DocumentBackend, WriteBatch, collection_prefix, doc_key, merge_patch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Table holding every document, keyed by `<collection>/<id>`.
pub(crate) const DOCS_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("documents");

/// Redb-backed document storage backend.
///
/// # Thread Safety
///
/// `RedbBackend` is `Clone` and can be shared across threads. The underlying
/// database handles concurrent access safely.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

fn decode(key: &str, bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).with_context(|| format!("Failed to deserialize document '{key}'"))
}

impl RedbBackend {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - Database file cannot be opened or created (permissions, disk full, etc.)
    /// - Initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open document database: {}", path.display()))?;

        // Create the table up front so read transactions never miss it
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(DOCS_TABLE)
                .context("Failed to initialize documents table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get_sync(&self, key: &str) -> Result<Option<Value>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(DOCS_TABLE)
            .context("Failed to open documents table")?;

        let guard = table
            .get(key)
            .with_context(|| format!("Failed to read document '{key}'"))?;

        guard.map(|bytes| decode(key, bytes.value())).transpose()
    }

    fn list_sync(&self, prefix: &str) -> Result<Vec<(String, Value)>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(DOCS_TABLE)
            .context("Failed to open documents table")?;

        let mut docs = Vec::new();
        for item in table.range(prefix..).context("Failed to scan documents table")? {
            let (key, value) = item.context("Failed to read document entry")?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            docs.push((key[prefix.len()..].to_string(), decode(key, value.value())?));
        }

        Ok(docs)
    }

    fn commit_sync(&self, ops: Vec<BatchOp>) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(DOCS_TABLE)
                .context("Failed to open documents table")?;

            for op in ops {
                match op {
                    BatchOp::Set { collection, id, doc } => {
                        let key = doc_key(&collection, &id);
                        let bytes = serde_json::to_vec(&doc)
                            .with_context(|| format!("Failed to serialize document '{key}'"))?;
                        table
                            .insert(key.as_str(), bytes.as_slice())
                            .with_context(|| format!("Failed to write document '{key}'"))?;
                    },
                    BatchOp::Delete { collection, id } => {
                        let key = doc_key(&collection, &id);
                        table
                            .remove(key.as_str())
                            .with_context(|| format!("Failed to remove document '{key}'"))?;
                    },
                }
            }
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;

        Ok(())
    }

    fn delete_sync(&self, key: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        let removed = {
            let mut table = write_txn
                .open_table(DOCS_TABLE)
                .context("Failed to open documents table")?;
            table
                .remove(key)
                .with_context(|| format!("Failed to remove document '{key}'"))?
                .is_some()
        };

        write_txn
            .commit()
            .context("Failed to commit delete transaction")?;

        Ok(removed)
    }

    /// Read-merge-write inside a single write transaction.
    fn update_sync(&self, key: &str, patch: Map<String, Value>) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        let updated = {
            let mut table = write_txn
                .open_table(DOCS_TABLE)
                .context("Failed to open documents table")?;

            let existing = table
                .get(key)
                .with_context(|| format!("Failed to read document '{key}'"))?
                .map(|bytes| bytes.value().to_vec());

            match existing {
                Some(bytes) => {
                    let mut doc = decode(key, &bytes)?;
                    merge_patch(&mut doc, patch);
                    let bytes = serde_json::to_vec(&doc)
                        .with_context(|| format!("Failed to serialize document '{key}'"))?;
                    table
                        .insert(key, bytes.as_slice())
                        .with_context(|| format!("Failed to write document '{key}'"))?;
                    true
                },
                None => false,
            }
        };

        write_txn
            .commit()
            .context("Failed to commit update transaction")?;

        Ok(updated)
    }
}

#[async_trait]
impl DocumentBackend for RedbBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let backend = self.clone();
        let key = doc_key(collection, id);
        tokio::task::spawn_blocking(move || backend.get_sync(&key))
            .await
            .context("Task join error")?
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.set(collection, id, doc);
        self.commit(batch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let backend = self.clone();
        let key = doc_key(collection, id);
        tokio::task::spawn_blocking(move || backend.delete_sync(&key))
            .await
            .context("Task join error")?
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let backend = self.clone();
        let prefix = collection_prefix(collection);
        tokio::task::spawn_blocking(move || backend.list_sync(&prefix))
            .await
            .context("Task join error")?
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let backend = self.clone();
        let ops = batch.into_ops();
        tokio::task::spawn_blocking(move || backend.commit_sync(ops))
            .await
            .context("Task join error")?
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<bool> {
        let backend = self.clone();
        let key = doc_key(collection, id);
        tokio::task::spawn_blocking(move || backend.update_sync(&key, patch))
            .await
            .context("Task join error")?
    }
}
