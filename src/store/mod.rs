//! Document store with pluggable backends.
//!
//! Stores JSON documents addressed by `(collection, id)`, with an atomic
//! multi-write batch. Supports multiple backends:
//!
//! - **RedbBackend**: Persistent storage with ACID guarantees (default)
//! - **MemoryBackend**: Fast, non-persistent storage (ideal for testing)
//!
//! # Example
//!
//! ```ignore
//! use folio::store::{DocStore, WriteBatch};
//!
//! let store = DocStore::file("~/.folio/folio.redb")?;
//!
//! let mut batch = WriteBatch::new();
//! batch.delete("home-pins", "img-1").set("home-pins", "img-2", pin);
//! store.commit(batch).await?;
//! ```

mod backend;
mod memory;
mod redb;
mod store;

#[cfg(test)]
mod tests;

pub use backend::{BatchOp, DocumentBackend, WriteBatch};
pub use memory::MemoryBackend;
pub use self::redb::RedbBackend;
pub use store::DocStore;
