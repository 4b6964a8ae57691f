//! Category membership reconciliation.
//!
//! Every operation here reads the affected categories, computes their new
//! state in memory, and writes all changes with a single store batch.
//! Categories that end up empty are deleted in the same batch.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::types::{CATEGORIES, Category, CategoryPhoto, IMAGES, Image, PhotoPatch, Variant};
use super::{Catalog, normalize_key};
use crate::error::{CatalogError, Result};
use crate::store::WriteBatch;

/// Move a single image into a category (or out of all of them).
#[derive(Debug, Clone, Default)]
pub struct AssignCategory {
    pub image_id: String,
    /// Target slug; `None` or blank removes the image from every category.
    pub slug: Option<String>,
    /// Explicit variant. When absent the image keeps the variant it had in
    /// its previous category, or `original` if it had none.
    pub variant: Option<Variant>,
}

impl AssignCategory {
    /// Assign `image_id` to `slug`.
    pub fn new(image_id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            slug: Some(slug.into()),
            variant: None,
        }
    }

    /// Remove `image_id` from every category.
    pub fn uncategorize(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            slug: None,
            variant: None,
        }
    }

    /// Set the variant explicitly.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }
}

/// What an assignment did to the target category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOutcome {
    /// Appended to the target.
    Added,
    /// Already in the target; its entry was refreshed in place.
    Updated,
    /// Removed from its category (no target given).
    Removed,
    /// No target and the image was not categorized.
    Unchanged,
}

/// Result of [`Catalog::assign_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub slug: Option<String>,
    pub variant: Variant,
    pub outcome: AssignOutcome,
}

/// Move many images into one category.
#[derive(Debug, Clone, Default)]
pub struct BatchAssign {
    pub image_ids: Vec<String>,
    pub slug: String,
    /// Defaults to `original`.
    pub variant: Option<Variant>,
}

/// Result of [`Catalog::batch_assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub slug: String,
    /// Number of distinct images now in the target.
    pub updated: usize,
    /// Of those, how many were appended rather than refreshed.
    pub added: usize,
    /// Whether the target category was created.
    pub created: bool,
}

/// Queue the persisted form of `category`: deleted when empty, else written.
fn stage(batch: &mut WriteBatch, category: &Category) -> Result<()> {
    if category.is_empty() {
        debug!(slug = %category.slug, "Category emptied, deleting");
        batch.delete(CATEGORIES, &category.slug);
    } else {
        let doc = serde_json::to_value(category).map_err(anyhow::Error::from)?;
        batch.set(CATEGORIES, &category.slug, doc);
    }
    Ok(())
}

fn require(raw: &str, message: &str) -> Result<String> {
    normalize_key(raw).ok_or_else(|| CatalogError::validation(message))
}

impl Catalog {
    /// Every category, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the category collection cannot be read.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.load_categories().await?;
        categories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(categories)
    }

    /// Looks up one category.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the read fails.
    pub async fn get_category(&self, slug: &str) -> Result<Option<Category>> {
        let Some(slug) = normalize_key(slug) else {
            return Ok(None);
        };
        let category: Option<Category> = self.store.get_as(CATEGORIES, &slug).await?;
        Ok(category.map(|mut c| {
            c.slug = slug;
            c
        }))
    }

    /// The document key is authoritative for the slug.
    async fn load_categories(&self) -> Result<Vec<Category>> {
        Ok(self
            .store
            .list_as::<Category>(CATEGORIES)
            .await?
            .into_iter()
            .map(|(slug, mut category)| {
                category.slug = slug;
                category
            })
            .collect())
    }

    /// Places one image in exactly one category, or in none when no slug is
    /// given.
    ///
    /// Removes the image from any other category (deleting categories left
    /// empty), refreshes its entry if it is already in the target, and
    /// otherwise appends it, creating the target when needed.
    ///
    /// # Errors
    ///
    /// `Validation` if the image id is empty, `NotFound` if the image is not
    /// in the image store.
    pub async fn assign_category(&self, req: AssignCategory) -> Result<Assignment> {
        let image_id = require(&req.image_id, "Image ID is required")?;
        let image: Image = self
            .store
            .get_as(IMAGES, &image_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Image not found"))?;
        let target = req.slug.as_deref().and_then(normalize_key);

        let _guard = self.locks.exclusive().await;
        let mut categories = self.load_categories().await?;

        let previous_variant = categories
            .iter()
            .flat_map(|c| c.images.iter())
            .find(|p| p.id == image_id)
            .map(|p| p.variant);
        let variant = req.variant.or(previous_variant).unwrap_or_default();
        let photo = CategoryPhoto::from_image(&image, variant);

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        let mut outcome = None;

        for category in &mut categories {
            if target.as_deref() == Some(category.slug.as_str()) {
                if category.contains(&image_id) {
                    category.upsert(photo.clone());
                    category.touch(now);
                    stage(&mut batch, category)?;
                    outcome = Some(AssignOutcome::Updated);
                }
            } else if category.remove_where(|id| id == image_id) > 0 {
                info!(image_id = %image_id, from = %category.slug, "Removed image from category");
                category.touch(now);
                stage(&mut batch, category)?;
                outcome.get_or_insert(AssignOutcome::Removed);
            }
        }

        let outcome = match &target {
            Some(slug) if outcome != Some(AssignOutcome::Updated) => {
                match categories.iter_mut().find(|c| &c.slug == slug) {
                    Some(category) => {
                        category.upsert(photo);
                        category.touch(now);
                        stage(&mut batch, category)?;
                    },
                    None => {
                        info!(slug = %slug, "Creating category");
                        stage(&mut batch, &Category::new(slug.clone(), vec![photo], now))?;
                    },
                }
                AssignOutcome::Added
            },
            Some(_) => AssignOutcome::Updated,
            None => outcome.unwrap_or(AssignOutcome::Unchanged),
        };

        self.store.commit(batch).await?;
        self.prune_slug_locks(&categories, target.as_deref());

        Ok(Assignment {
            slug: target,
            variant,
            outcome,
        })
    }

    /// Moves a set of images into one category.
    ///
    /// Every id ends up in the target exactly once (entries already there
    /// are refreshed with the batch's variant) and is removed from every
    /// other category. Duplicate ids in the request are collapsed.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty id list or slug; `NotFound` listing every
    /// id that is not in the image store (nothing is written in that case).
    pub async fn batch_assign(&self, req: BatchAssign) -> Result<BatchOutcome> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = req
            .image_ids
            .iter()
            .filter_map(|id| normalize_key(id))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if ids.is_empty() {
            return Err(CatalogError::validation("Image IDs array is required"));
        }
        let slug = require(&req.slug, "Slug is required")?;
        let variant = req.variant.unwrap_or_default();

        let images: Vec<Option<Image>> = self.store.get_many_as(IMAGES, &ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .zip(&images)
            .filter(|(_, image)| image.is_none())
            .map(|(id, _)| id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::not_found_ids("Some images not found", missing));
        }
        let photos: Vec<CategoryPhoto> = images
            .iter()
            .flatten()
            .map(|image| CategoryPhoto::from_image(image, variant))
            .collect();

        let _guard = self.locks.exclusive().await;
        let mut categories = self.load_categories().await?;

        let now = Utc::now();
        let mut batch = WriteBatch::new();

        let (mut target, created) = match categories.iter().position(|c| c.slug == slug) {
            Some(pos) => (categories.swap_remove(pos), false),
            None => (Category::new(slug.clone(), Vec::new(), now), true),
        };
        let added = photos
            .into_iter()
            .map(|photo| target.upsert(photo))
            .filter(|appended| *appended)
            .count();
        target.touch(now);
        stage(&mut batch, &target)?;

        for category in &mut categories {
            let removed = category.remove_where(|id| seen.contains(id));
            if removed > 0 {
                debug!(slug = %category.slug, removed, "Moved images out of category");
                category.touch(now);
                stage(&mut batch, category)?;
            }
        }

        self.store.commit(batch).await?;
        self.prune_slug_locks(&categories, Some(slug.as_str()));
        info!(slug = %slug, count = ids.len(), added, created, "Batch category assignment");

        Ok(BatchOutcome {
            slug,
            updated: ids.len(),
            added,
            created,
        })
    }

    /// Renames a category, keeping its photos and creation time.
    ///
    /// The new document is written and the old one deleted in one batch.
    ///
    /// # Errors
    ///
    /// `Validation` if either slug is empty or both are equal, `NotFound` if
    /// `old_slug` doesn't exist, `Conflict` if `new_slug` already does.
    pub async fn rename_category(&self, old_slug: &str, new_slug: &str) -> Result<Category> {
        let (Some(old_slug), Some(new_slug)) = (normalize_key(old_slug), normalize_key(new_slug))
        else {
            return Err(CatalogError::validation(
                "Both oldSlug and newSlug are required",
            ));
        };
        if old_slug == new_slug {
            return Err(CatalogError::validation(
                "New slug must be different from old slug",
            ));
        }

        let _guard = self.locks.exclusive().await;

        let mut category: Category = self
            .store
            .get_as(CATEGORIES, &old_slug)
            .await?
            .ok_or_else(|| CatalogError::not_found("Old slug not found"))?;
        if self.store.exists(CATEGORIES, &new_slug).await? {
            return Err(CatalogError::conflict("New slug already exists"));
        }

        category.slug.clone_from(&new_slug);
        category.touch(Utc::now());

        let mut batch = WriteBatch::new();
        stage(&mut batch, &category)?;
        batch.delete(CATEGORIES, &old_slug);
        self.store.commit(batch).await?;
        self.locks.forget(&old_slug);

        info!(from = %old_slug, to = %new_slug, "Renamed category");
        Ok(category)
    }

    /// Replaces a category's photo list with `photos` verbatim.
    ///
    /// The caller is trusted to send the same set of photos in a new order.
    /// An empty list deletes the category.
    ///
    /// # Errors
    ///
    /// `Validation` if the slug is empty, `NotFound` if the category doesn't
    /// exist.
    pub async fn reorder_category(&self, slug: &str, photos: Vec<CategoryPhoto>) -> Result<()> {
        let slug = require(slug, "Slug is required")?;
        self.mutate_category(&slug, Utc::now(), |category| {
            category.images = photos;
            Ok(())
        })
        .await
        .map(|_| ())
    }

    /// Overwrites the provided fields of one photo inside a category.
    ///
    /// # Errors
    ///
    /// `Validation` if the slug or photo id is empty, `NotFound` if the
    /// category or the photo within it doesn't exist.
    pub async fn edit_photo(&self, slug: &str, photo_id: &str, patch: PhotoPatch) -> Result<CategoryPhoto> {
        let (Some(slug), Some(photo_id)) = (normalize_key(slug), normalize_key(photo_id)) else {
            return Err(CatalogError::validation("Slug and photoId are required"));
        };

        let category = self
            .mutate_category(&slug, Utc::now(), |category| {
                let photo = category
                    .images
                    .iter_mut()
                    .find(|p| p.id == photo_id)
                    .ok_or_else(|| CatalogError::not_found("Photo not found in category"))?;
                patch.apply(photo);
                Ok(())
            })
            .await?;

        category
            .images
            .into_iter()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| CatalogError::not_found("Photo not found in category"))
    }

    /// Removes one photo from a category, deleting the category if it was
    /// the last one.
    ///
    /// Returns true if the category was deleted.
    ///
    /// # Errors
    ///
    /// `Validation` if the slug or photo id is empty, `NotFound` if the
    /// category or the photo within it doesn't exist.
    pub async fn remove_photo(&self, slug: &str, photo_id: &str) -> Result<bool> {
        let (Some(slug), Some(photo_id)) = (normalize_key(slug), normalize_key(photo_id)) else {
            return Err(CatalogError::validation("Slug and photoId are required"));
        };

        let category = self
            .mutate_category(&slug, Utc::now(), |category| {
                if category.remove_where(|id| id == photo_id) == 0 {
                    return Err(CatalogError::not_found("Photo not found in category"));
                }
                Ok(())
            })
            .await?;

        Ok(category.is_empty())
    }

    /// Read-modify-write of a single category under its slug lock.
    ///
    /// Returns the category as persisted (or as it was when deleted).
    async fn mutate_category<F>(&self, slug: &str, now: DateTime<Utc>, mutate: F) -> Result<Category>
    where
        F: FnOnce(&mut Category) -> Result<()>,
    {
        let _guard = self.locks.slug(slug).await;

        let mut category: Category = self
            .store
            .get_as(CATEGORIES, slug)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category not found"))?;
        category.slug = slug.to_string();

        mutate(&mut category)?;
        category.touch(now);

        let mut batch = WriteBatch::new();
        stage(&mut batch, &category)?;
        self.store.commit(batch).await?;
        Ok(category)
    }

    /// Drop slug mutexes of every category no longer stored, including
    /// ones emptied earlier by `remove_photo` or `reorder_category`.
    ///
    /// `categories` is the full catalog as loaded under the exclusive lock.
    fn prune_slug_locks(&self, categories: &[Category], target: Option<&str>) {
        let live: HashSet<&str> = categories
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.slug.as_str())
            .chain(target)
            .collect();
        self.locks.retain(|slug| live.contains(slug));
    }
}
