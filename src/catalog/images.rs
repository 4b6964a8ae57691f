//! Image registry: metadata records produced by the upload pipeline.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::types::{IMAGES, Image, NewImage};
use super::{Catalog, normalize_key};
use crate::constants::MAX_IMAGE_SIZE;
use crate::error::{CatalogError, Result};

fn validate_new_image(new: &NewImage) -> Result<()> {
    if new.url.trim().is_empty() {
        return Err(CatalogError::validation("Image URL is required"));
    }
    if new.file_name.trim().is_empty() {
        return Err(CatalogError::validation("File name is required"));
    }
    if !new.file_type.starts_with("image/") {
        return Err(CatalogError::validation(format!(
            "File type {} is not supported. Only image files are allowed.",
            new.file_type
        )));
    }
    if new.file_size > MAX_IMAGE_SIZE {
        #[allow(clippy::cast_precision_loss)]
        let size_mb = new.file_size as f64 / (1024.0 * 1024.0);
        return Err(CatalogError::validation(format!(
            "The file size ({size_mb:.2}MB) exceeds the 10MB limit."
        )));
    }
    Ok(())
}

impl Catalog {
    /// Records an uploaded image on behalf of `uploaded_by`.
    ///
    /// Uses the pipeline-supplied id when present, otherwise generates
    /// `img-<uuid>`. Re-registering an existing id overwrites it.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty url or file name, a non-image MIME type,
    /// or a file over 10 MiB.
    pub async fn register_image(&self, uploaded_by: &str, new: NewImage) -> Result<Image> {
        validate_new_image(&new)?;

        let id = new
            .id
            .as_deref()
            .and_then(normalize_key)
            .unwrap_or_else(|| format!("img-{}", Uuid::new_v4()));

        let image = Image {
            id,
            url: new.url.trim().to_string(),
            file_id: new.file_id,
            file_name: new.file_name,
            file_size: new.file_size,
            file_type: new.file_type,
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: Utc::now(),
            alt: new.alt.unwrap_or_default(),
            updated_at: None,
        };

        self.store.put(IMAGES, &image.id, &image).await?;
        info!(image_id = %image.id, %uploaded_by, "Registered image");
        Ok(image)
    }

    /// All images, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the image collection cannot be read.
    pub async fn list_images(&self) -> Result<Vec<Image>> {
        let mut images: Vec<Image> = self
            .store
            .list_as::<Image>(IMAGES)
            .await?
            .into_iter()
            .map(|(_, image)| image)
            .collect();
        images.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(images)
    }

    /// Looks up one image.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the read fails.
    pub async fn get_image(&self, id: &str) -> Result<Option<Image>> {
        Ok(self.store.get_as(IMAGES, id).await?)
    }

    /// Sets an image's alt text (empty when `alt` is `None`).
    ///
    /// Category entries keep their own copy; use
    /// [`Catalog::edit_photo`] to change those.
    ///
    /// # Errors
    ///
    /// `Validation` if `id` is empty, `NotFound` if the image doesn't exist.
    pub async fn update_image_alt(&self, id: &str, alt: Option<String>) -> Result<()> {
        let id = normalize_key(id).ok_or_else(|| CatalogError::validation("Image ID is required"))?;

        let mut patch = Map::new();
        patch.insert("alt".into(), Value::String(alt.unwrap_or_default()));
        patch.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));

        if !self.store.update(IMAGES, &id, patch).await? {
            return Err(CatalogError::not_found("Image not found"));
        }
        Ok(())
    }

    /// Deletes an image record. Category entries and pins that reference it
    /// are left in place.
    ///
    /// Returns whether the image existed.
    ///
    /// # Errors
    ///
    /// `Validation` if `id` is empty.
    pub async fn delete_image(&self, id: &str) -> Result<bool> {
        let id = normalize_key(id).ok_or_else(|| CatalogError::validation("Image ID is required"))?;
        let existed = self.store.delete(IMAGES, &id).await?;
        debug!(image_id = %id, existed, "Deleted image");
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocStore;

    fn upload(name: &str) -> NewImage {
        NewImage {
            url: format!("https://cdn.test/{name}"),
            file_id: format!("f-{name}"),
            file_name: name.to_string(),
            file_size: 1024,
            file_type: "image/jpeg".to_string(),
            ..NewImage::default()
        }
    }

    #[tokio::test]
    async fn test_register_generates_id() {
        let catalog = Catalog::new(DocStore::memory());
        let image = catalog.register_image("uid-1", upload("a.jpg")).await.unwrap();

        assert!(image.id.starts_with("img-"));
        assert_eq!(image.uploaded_by, "uid-1");
        assert_eq!(catalog.get_image(&image.id).await.unwrap(), Some(image));
    }

    #[tokio::test]
    async fn test_register_keeps_pipeline_id() {
        let catalog = Catalog::new(DocStore::memory());
        let new = NewImage {
            id: Some("tg-42".into()),
            ..upload("a.jpg")
        };
        let image = catalog.register_image("uid-1", new).await.unwrap();
        assert_eq!(image.id, "tg-42");
    }

    #[tokio::test]
    async fn test_register_rejects_non_images() {
        let catalog = Catalog::new(DocStore::memory());
        let new = NewImage {
            file_type: "application/pdf".into(),
            ..upload("a.pdf")
        };
        let err = catalog.register_image("uid-1", new).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_oversized() {
        let catalog = Catalog::new(DocStore::memory());
        let new = NewImage {
            file_size: MAX_IMAGE_SIZE + 1,
            ..upload("big.jpg")
        };
        let err = catalog.register_image("uid-1", new).await.unwrap_err();
        assert!(err.to_string().contains("10MB"));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let catalog = Catalog::new(DocStore::memory());
        let first = catalog.register_image("u", upload("1.jpg")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = catalog.register_image("u", upload("2.jpg")).await.unwrap();

        let ids: Vec<String> = catalog
            .list_images()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_alt() {
        let catalog = Catalog::new(DocStore::memory());
        let image = catalog.register_image("u", upload("a.jpg")).await.unwrap();

        catalog
            .update_image_alt(&image.id, Some("Harbour at dusk".into()))
            .await
            .unwrap();
        let stored = catalog.get_image(&image.id).await.unwrap().unwrap();
        assert_eq!(stored.alt, "Harbour at dusk");
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_alt_missing_image() {
        let catalog = Catalog::new(DocStore::memory());
        let err = catalog.update_image_alt("nope", None).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = catalog.update_image_alt("  ", None).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let catalog = Catalog::new(DocStore::memory());
        let image = catalog.register_image("u", upload("a.jpg")).await.unwrap();

        assert!(catalog.delete_image(&image.id).await.unwrap());
        assert!(!catalog.delete_image(&image.id).await.unwrap());
    }
}
