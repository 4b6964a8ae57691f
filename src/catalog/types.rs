//! Core types for the catalog: images, categories, homepage pins and
//! per-user settings, in the shape they are stored and served.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection holding image metadata, keyed by image id.
pub const IMAGES: &str = "images";
/// Collection holding categories, keyed by slug.
pub const CATEGORIES: &str = "categories";
/// Collection holding homepage pins, keyed by photo id.
pub const HOME_PINS: &str = "home-pins";
/// Collection holding per-user settings, keyed by uid.
pub const USER_SETTINGS: &str = "user-settings";

/// Display hint for an image inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Full-bleed, uncropped.
    #[default]
    Original,
    /// Cropped to a square.
    Square,
}

/// Metadata of an uploaded image. The binary lives with the upload
/// pipeline; only its public URL is kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub file_id: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Image metadata handed over by the upload pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewImage {
    /// Id assigned by the pipeline; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Denormalized copy of an image inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPhoto {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub variant: Variant,
    pub uploaded_at: DateTime<Utc>,
}

impl CategoryPhoto {
    /// Snapshot the category-relevant fields of `image`.
    pub fn from_image(image: &Image, variant: Variant) -> Self {
        Self {
            id: image.id.clone(),
            url: image.url.clone(),
            file_name: image.file_name.clone(),
            alt: image.alt.clone(),
            variant,
            uploaded_at: image.uploaded_at,
        }
    }
}

/// Named, ordered collection of photos.
///
/// A stored category is never empty, and no image id appears in more than
/// one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub slug: String,
    #[serde(default)]
    pub images: Vec<CategoryPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a category stamped with `now`.
    pub fn new(slug: impl Into<String>, images: Vec<CategoryPhoto>, now: DateTime<Utc>) -> Self {
        Self {
            slug: slug.into(),
            images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Index of the first entry for `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.images.iter().position(|photo| photo.id == id)
    }

    /// Returns true if `id` is in this category.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Overwrite the entry for `photo.id` in place, or append it.
    ///
    /// Later duplicates of the same id are dropped. Returns true if the
    /// photo was appended.
    pub fn upsert(&mut self, photo: CategoryPhoto) -> bool {
        match self.position(&photo.id) {
            Some(pos) => {
                let id = photo.id.clone();
                self.images[pos] = photo;
                let mut index = 0;
                self.images.retain(|p| {
                    let keep = index <= pos || p.id != id;
                    index += 1;
                    keep
                });
                false
            },
            None => {
                self.images.push(photo);
                true
            },
        }
    }

    /// Drop every entry whose id satisfies `pred`. Returns the number removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&str) -> bool) -> usize {
        let before = self.images.len();
        self.images.retain(|photo| !pred(&photo.id));
        before - self.images.len()
    }

    /// Returns true if no photos remain.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Refresh `updatedAt`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Partial update for a photo inside a category; `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhotoPatch {
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub variant: Option<Variant>,
}

impl PhotoPatch {
    /// Overwrite the provided fields of `photo`.
    pub fn apply(&self, photo: &mut CategoryPhoto) {
        if let Some(alt) = &self.alt {
            photo.alt.clone_from(alt);
        }
        if let Some(url) = &self.url {
            photo.url.clone_from(url);
        }
        if let Some(variant) = self.variant {
            photo.variant = variant;
        }
    }
}

/// A photo selected for the homepage and its display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepagePin {
    pub photo_id: String,
    pub order: usize,
}

/// Stored form of a pin; the photo id is the document key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PinRecord {
    pub order: usize,
    pub updated_at: DateTime<Utc>,
}

/// A pinned image resolved against the image store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinnedImage {
    #[serde(flatten)]
    pub image: Image,
    pub order: usize,
}

/// A Telegram chat the upload pipeline can send photos to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Per-user settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub telegram_chats: Vec<TelegramChat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo(id: &str, alt: &str) -> CategoryPhoto {
        CategoryPhoto {
            id: id.to_string(),
            url: format!("https://cdn.test/{id}"),
            file_name: format!("{id}.jpg"),
            alt: alt.to_string(),
            variant: Variant::Original,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_variant_wire_format() {
        assert_eq!(serde_json::to_value(Variant::Square).unwrap(), json!("square"));
        let parsed: Variant = serde_json::from_value(json!("original")).unwrap();
        assert_eq!(parsed, Variant::Original);
        assert!(serde_json::from_value::<Variant>(json!("wide")).is_err());
    }

    #[test]
    fn test_category_wire_format_is_camel_case() {
        let category = Category::new("paris", vec![photo("a", "")], Utc::now());
        let value = serde_json::to_value(&category).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value["images"][0].get("file_name").is_some());
        assert!(value["images"][0].get("uploaded_at").is_some());
    }

    #[test]
    fn test_upsert_appends_new() {
        let mut category = Category::new("c", vec![photo("a", "")], Utc::now());
        assert!(category.upsert(photo("b", "")));
        let ids: Vec<&str> = category.images.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_upsert_overwrites_in_place_and_drops_duplicates() {
        let mut category = Category::new(
            "c",
            vec![photo("a", ""), photo("b", "old"), photo("c", ""), photo("b", "dup")],
            Utc::now(),
        );
        assert!(!category.upsert(photo("b", "new")));

        let ids: Vec<&str> = category.images.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(category.images[1].alt, "new");
    }

    #[test]
    fn test_remove_where_counts() {
        let mut category =
            Category::new("c", vec![photo("a", ""), photo("b", ""), photo("c", "")], Utc::now());
        assert_eq!(category.remove_where(|id| id == "a" || id == "c"), 2);
        assert_eq!(category.images.len(), 1);
        assert_eq!(category.remove_where(|id| id == "zzz"), 0);
    }

    #[test]
    fn test_patch_only_touches_provided_fields() {
        let mut p = photo("a", "keep");
        let patch = PhotoPatch {
            variant: Some(Variant::Square),
            ..PhotoPatch::default()
        };
        patch.apply(&mut p);
        assert_eq!(p.alt, "keep");
        assert_eq!(p.variant, Variant::Square);
    }

    #[test]
    fn test_pinned_image_flattens() {
        let image = Image {
            id: "a".into(),
            url: "u".into(),
            file_id: String::new(),
            file_name: "a.jpg".into(),
            file_size: 1,
            file_type: "image/jpeg".into(),
            uploaded_by: "me".into(),
            uploaded_at: Utc::now(),
            alt: String::new(),
            updated_at: None,
        };
        let value = serde_json::to_value(PinnedImage { image, order: 3 }).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["order"], 3);
        assert!(value.get("updated_at").is_none());
    }
}
