//! Photo catalog: image registry, categories, homepage pins and settings.
//!
//! The [`Catalog`] owns the reconciliation rules that keep the three stores
//! consistent:
//!
//! - an image id appears in at most one category, and categories are never
//!   stored empty
//! - homepage pin orders are always exactly `0..len`
//! - every multi-document mutation is written with one atomic store batch
//!   while holding the matching writer lock (see `locks`)
//!
//! Images may be deleted while still referenced; categories and pins
//! tolerate the dangling ids.
//!
//! # Example
//!
//! ```ignore
//! use folio::catalog::{AssignCategory, Catalog, Variant};
//! use folio::store::DocStore;
//!
//! let catalog = Catalog::new(DocStore::memory());
//! catalog
//!     .assign_category(AssignCategory::new("img-1", "paris").with_variant(Variant::Square))
//!     .await?;
//! ```

mod categories;
mod homepage;
mod images;
mod locks;
mod settings;
mod types;


use std::sync::Arc;

use crate::store::DocStore;
use locks::CatalogLocks;

pub use categories::{AssignCategory, AssignOutcome, Assignment, BatchAssign, BatchOutcome};
pub use types::{
    CATEGORIES, Category, CategoryPhoto, HOME_PINS, HomepagePin, IMAGES, Image, NewImage,
    PhotoPatch, PinnedImage, TelegramChat, USER_SETTINGS, UserSettings, Variant,
};

/// Catalog service over a [`DocStore`].
///
/// `Catalog` is `Clone`; clones share the store handle and writer locks.
#[derive(Clone)]
pub struct Catalog {
    store: DocStore,
    locks: Arc<CatalogLocks>,
}

impl Catalog {
    /// Creates a catalog over `store`.
    pub fn new(store: DocStore) -> Self {
        Self {
            store,
            locks: Arc::new(CatalogLocks::new()),
        }
    }

    /// The underlying document store.
    pub fn store(&self) -> &DocStore {
        &self.store
    }
}

/// Trims `raw`, returning `None` if nothing is left.
pub(crate) fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
