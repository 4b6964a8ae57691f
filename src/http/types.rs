//! Request and response bodies for the HTTP API.
//!
//! Field names follow the JSON the portfolio front end already speaks:
//! camelCase for envelopes, snake_case inside image records.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    AssignOutcome, Category, CategoryPhoto, HomepagePin, Image, PinnedImage, TelegramChat, Variant,
};

// =============================================================================
// Shared
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// =============================================================================
// Images
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<Image>,
}

#[derive(Debug, Serialize)]
pub struct ImageCreatedResponse {
    pub success: bool,
    pub image: Image,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateAltRequest {
    pub id: String,
    pub alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageIdQuery {
    pub id: String,
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// Body of `PUT /api/category`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CategoryCommand {
    /// Move one image into `slug`, or out of every category when `slug` is
    /// missing or blank.
    Assign {
        #[serde(default)]
        id: String,
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        variant: Option<Variant>,
    },
    /// Replace the photo list of `slug`.
    Reorder {
        #[serde(default)]
        slug: String,
        photos: Vec<CategoryPhoto>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub variant: Variant,
    pub outcome: AssignOutcome,
}

/// Body returned by `PUT /api/category`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CategoryUpdateResponse {
    Assigned(AssignResponse),
    Reordered(MessageResponse),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditPhotoRequest {
    pub slug: String,
    pub photo_id: String,
    pub alt: Option<String>,
    pub url: Option<String>,
    pub variant: Option<Variant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemovePhotoQuery {
    pub slug: String,
    pub photo_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePhotoResponse {
    pub success: bool,
    pub message: String,
    pub category_deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchAssignRequest {
    pub image_ids: Vec<String>,
    pub slug: String,
    pub variant: Option<Variant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignResponse {
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
    pub added_count: usize,
    pub created: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_slug: String,
    pub new_slug: String,
}

#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub success: bool,
    pub message: String,
    pub category: Category,
}

// =============================================================================
// Public gallery
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GalleryQuery {
    pub slug: Option<String>,
}

/// Body of `GET /api/photos`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GalleryResponse {
    All { galleries: Vec<Category> },
    One(Category),
    /// Requested slug has no photos.
    Empty { slug: String, images: Vec<CategoryPhoto> },
}

// =============================================================================
// Homepage
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageResponse {
    pub selected_photos: Vec<HomepagePin>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinsUpdatedResponse {
    pub success: bool,
    pub selected_photos: Vec<HomepagePin>,
}

/// Body of `POST /api/homepage`. A missing `selectedPhotos` is rejected,
/// only an explicit `[]` clears the selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplacePinsRequest {
    pub selected_photos: Option<Vec<HomepagePin>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddPinRequest {
    pub photo_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MovePinRequest {
    pub position: usize,
}

#[derive(Debug, Serialize)]
pub struct PinnedImagesResponse {
    pub images: Vec<PinnedImage>,
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub telegram_chats: Vec<TelegramChat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    pub telegram_chats: Option<Vec<TelegramChat>>,
}
