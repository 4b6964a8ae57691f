//! Homepage pin list.
//!
//! Pins are stored one document per photo id. Every mutation rewrites the
//! whole list (delete all, insert all) in one batch so stored orders are
//! always `0..len`.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use super::types::{HOME_PINS, HomepagePin, IMAGES, Image, PinRecord, PinnedImage};
use super::{Catalog, normalize_key};
use crate::error::{CatalogError, Result};
use crate::store::WriteBatch;

/// Pins for `ids` in the given order, numbered from zero.
pub(crate) fn renumber<I, S>(ids: I) -> Vec<HomepagePin>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter()
        .enumerate()
        .map(|(order, id)| HomepagePin {
            photo_id: id.into(),
            order,
        })
        .collect()
}

/// Moves the element at `from` to `to` (clamped to the last index).
pub(crate) fn move_entry<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

impl Catalog {
    /// Current pins sorted by order.
    ///
    /// Ties (possible only in data written by older tools) are broken by id.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the pin collection cannot be read.
    pub async fn list_pins(&self) -> Result<Vec<HomepagePin>> {
        let mut pins: Vec<HomepagePin> = self
            .store
            .list_as::<PinRecord>(HOME_PINS)
            .await?
            .into_iter()
            .map(|(photo_id, record)| HomepagePin {
                photo_id,
                order: record.order,
            })
            .collect();
        pins.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.photo_id.cmp(&b.photo_id)));
        Ok(pins)
    }

    /// Replaces the pin list with `pins`.
    ///
    /// Entries are sorted by their supplied order and renumbered densely.
    ///
    /// # Errors
    ///
    /// `Validation` if a photo id is empty or appears twice.
    pub async fn replace_pins(&self, pins: Vec<HomepagePin>) -> Result<Vec<HomepagePin>> {
        let mut pins = pins;
        pins.sort_by_key(|pin| pin.order);

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(pins.len());
        for pin in pins {
            let id = normalize_key(&pin.photo_id)
                .ok_or_else(|| CatalogError::validation("Each selected photo needs a photoId"))?;
            if !seen.insert(id.clone()) {
                return Err(CatalogError::validation(format!(
                    "Photo {id} is selected more than once"
                )));
            }
            ids.push(id);
        }

        let _guard = self.locks.homepage().await;
        let pins = renumber(ids);
        self.write_pins(&pins).await?;
        info!(count = pins.len(), "Replaced homepage selection");
        Ok(pins)
    }

    /// Appends `photo_id` to the end of the pin list.
    ///
    /// Pinning an already pinned photo changes nothing.
    ///
    /// # Errors
    ///
    /// `Validation` if the id is empty, `NotFound` if the image doesn't exist.
    pub async fn add_pin(&self, photo_id: &str) -> Result<Vec<HomepagePin>> {
        let photo_id = normalize_key(photo_id)
            .ok_or_else(|| CatalogError::validation("Photo ID is required"))?;
        if !self.store.exists(IMAGES, &photo_id).await? {
            return Err(CatalogError::not_found("Image not found"));
        }

        let _guard = self.locks.homepage().await;
        let pins = self.list_pins().await?;
        if pins.iter().any(|pin| pin.photo_id == photo_id) {
            debug!(photo_id = %photo_id, "Photo already pinned");
            return Ok(pins);
        }

        let pins = renumber(
            pins.into_iter()
                .map(|pin| pin.photo_id)
                .chain(std::iter::once(photo_id)),
        );
        self.write_pins(&pins).await?;
        Ok(pins)
    }

    /// Unpins `photo_id` and closes the gap.
    ///
    /// # Errors
    ///
    /// `NotFound` if the photo isn't pinned.
    pub async fn remove_pin(&self, photo_id: &str) -> Result<Vec<HomepagePin>> {
        let photo_id = photo_id.trim();

        let _guard = self.locks.homepage().await;
        let pins = self.list_pins().await?;
        if !pins.iter().any(|pin| pin.photo_id == photo_id) {
            return Err(CatalogError::not_found("Photo is not on the homepage"));
        }

        let pins = renumber(
            pins.into_iter()
                .map(|pin| pin.photo_id)
                .filter(|id| id != photo_id),
        );
        self.write_pins(&pins).await?;
        Ok(pins)
    }

    /// Moves `photo_id` to `position`, clamped to the last slot.
    ///
    /// # Errors
    ///
    /// `NotFound` if the photo isn't pinned.
    pub async fn move_pin(&self, photo_id: &str, position: usize) -> Result<Vec<HomepagePin>> {
        let photo_id = photo_id.trim();

        let _guard = self.locks.homepage().await;
        let mut ids: Vec<String> = self
            .list_pins()
            .await?
            .into_iter()
            .map(|pin| pin.photo_id)
            .collect();
        let from = ids
            .iter()
            .position(|id| id == photo_id)
            .ok_or_else(|| CatalogError::not_found("Photo is not on the homepage"))?;

        move_entry(&mut ids, from, position);
        let pins = renumber(ids);
        self.write_pins(&pins).await?;
        Ok(pins)
    }

    /// Pinned images in pin order, skipping pins whose image is gone.
    ///
    /// The returned orders are renumbered over the surviving images.
    ///
    /// # Errors
    ///
    /// Returns `Store` if either collection cannot be read.
    pub async fn pinned_images(&self) -> Result<Vec<PinnedImage>> {
        let ids: Vec<String> = self
            .list_pins()
            .await?
            .into_iter()
            .map(|pin| pin.photo_id)
            .collect();
        let images: Vec<Option<Image>> = self.store.get_many_as(IMAGES, &ids).await?;

        Ok(images
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(order, image)| PinnedImage { image, order })
            .collect())
    }

    /// Rewrites the stored pin list. Caller holds the homepage lock.
    async fn write_pins(&self, pins: &[HomepagePin]) -> Result<()> {
        let now = Utc::now();
        let mut batch = WriteBatch::new();

        for (photo_id, _) in self.store.list_as::<serde_json::Value>(HOME_PINS).await? {
            batch.delete(HOME_PINS, &photo_id);
        }
        for pin in pins {
            let record = PinRecord {
                order: pin.order,
                updated_at: now,
            };
            let doc = serde_json::to_value(&record).map_err(anyhow::Error::from)?;
            batch.set(HOME_PINS, &pin.photo_id, doc);
        }

        self.store.commit(batch).await?;
        Ok(())
    }
}
