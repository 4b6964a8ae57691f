//! Writer serialization for catalog mutations.
//!
//! Operations that may touch several categories (assign, batch assign,
//! rename) hold the catalog lock exclusively. Operations confined to one
//! category hold it shared plus that slug's mutex, so edits to different
//! categories run in parallel. Pin mutations serialize on their own mutex.
//! Reads take no locks.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub(crate) struct CatalogLocks {
    catalog: RwLock<()>,
    slugs: DashMap<String, Arc<Mutex<()>>>,
    homepage: Mutex<()>,
}

/// Held while mutating a single category.
pub(crate) struct SlugGuard<'a> {
    _slug: OwnedMutexGuard<()>,
    _catalog: RwLockReadGuard<'a, ()>,
}

impl CatalogLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to every category.
    pub(crate) async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.catalog.write().await
    }

    /// Shared catalog access plus exclusive access to `slug`.
    pub(crate) async fn slug(&self, slug: &str) -> SlugGuard<'_> {
        let catalog = self.catalog.read().await;
        // Clone the Arc out so the DashMap shard lock is released before awaiting
        let mutex = self
            .slugs
            .entry(slug.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let slug = mutex.lock_owned().await;
        SlugGuard {
            _slug: slug,
            _catalog: catalog,
        }
    }

    /// Drop the mutex of a category that no longer exists.
    ///
    /// Only call while holding the exclusive catalog lock.
    pub(crate) fn forget(&self, slug: &str) {
        self.slugs.remove(slug);
    }

    /// Drop the mutex of every slug `live` rejects.
    ///
    /// Only call while holding the exclusive catalog lock.
    pub(crate) fn retain(&self, mut live: impl FnMut(&str) -> bool) {
        self.slugs.retain(|slug, _| live(slug));
    }

    #[cfg(test)]
    pub(crate) fn is_tracked(&self, slug: &str) -> bool {
        self.slugs.contains_key(slug)
    }

    /// Exclusive access to the homepage pin list.
    pub(crate) async fn homepage(&self) -> MutexGuard<'_, ()> {
        self.homepage.lock().await
    }
}
