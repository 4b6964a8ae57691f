//! Homepage selection handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::super::extract::{AdminUser, ApiJson, ApiPath};
use super::super::types::{
    AddPinRequest, HomepageResponse, MovePinRequest, PinnedImagesResponse, PinsUpdatedResponse,
    ReplacePinsRequest,
};
use super::super::{AppError, SharedState, metrics};
use crate::catalog::HomepagePin;
use crate::constants::IMAGE_CACHE_CONTROL;
use crate::error::CatalogError;

fn updated(selected_photos: Vec<HomepagePin>) -> Json<PinsUpdatedResponse> {
    Json(PinsUpdatedResponse {
        success: true,
        selected_photos,
    })
}

/// GET /api/homepage - Current pins in order.
pub(crate) async fn homepage_get(
    State(state): State<SharedState>,
) -> Result<Json<HomepageResponse>, AppError> {
    metrics::record_catalog_operation("homepage_get");
    let selected_photos = state.catalog.list_pins().await?;
    Ok(Json(HomepageResponse { selected_photos }))
}

/// POST /api/homepage - Replace the whole selection.
pub(crate) async fn homepage_replace(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<ReplacePinsRequest>,
) -> Result<Json<PinsUpdatedResponse>, AppError> {
    metrics::record_catalog_operation("homepage_replace");
    let selected_photos = req
        .selected_photos
        .ok_or_else(|| CatalogError::validation("selectedPhotos must be an array"))?;
    let pins = state.catalog.replace_pins(selected_photos).await?;
    Ok(updated(pins))
}

/// POST /api/homepage/pins - Pin one photo at the end.
pub(crate) async fn homepage_add_pin(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<AddPinRequest>,
) -> Result<Json<PinsUpdatedResponse>, AppError> {
    metrics::record_catalog_operation("homepage_add_pin");
    let pins = state.catalog.add_pin(&req.photo_id).await?;
    Ok(updated(pins))
}

/// DELETE /api/homepage/pins/{photo_id} - Unpin one photo.
pub(crate) async fn homepage_remove_pin(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiPath(photo_id): ApiPath<String>,
) -> Result<Json<PinsUpdatedResponse>, AppError> {
    metrics::record_catalog_operation("homepage_remove_pin");
    let pins = state.catalog.remove_pin(&photo_id).await?;
    Ok(updated(pins))
}

/// PUT /api/homepage/pins/{photo_id} - Move one photo to `position`.
pub(crate) async fn homepage_move_pin(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiPath(photo_id): ApiPath<String>,
    ApiJson(req): ApiJson<MovePinRequest>,
) -> Result<Json<PinsUpdatedResponse>, AppError> {
    metrics::record_catalog_operation("homepage_move_pin");
    let pins = state.catalog.move_pin(&photo_id, req.position).await?;
    Ok(updated(pins))
}

/// GET /api/homepage/images - Pinned images resolved, in pin order.
pub(crate) async fn homepage_images(
    State(state): State<SharedState>,
) -> Result<Json<PinnedImagesResponse>, AppError> {
    metrics::record_catalog_operation("homepage_images");
    let images = state.catalog.pinned_images().await?;
    Ok(Json(PinnedImagesResponse { images }))
}

/// GET /api/homepage/image/{id} - Image bytes fetched from the stored URL.
pub(crate) async fn homepage_image(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Response, AppError> {
    metrics::record_catalog_operation("homepage_image");
    let image = state
        .catalog
        .get_image(&id)
        .await?
        .ok_or_else(|| CatalogError::not_found("Image not found"))?;
    if image.url.trim().is_empty() {
        return Err(CatalogError::not_found("Image URL not found").into());
    }

    let fetch_failed = |reason: String| {
        warn!(image_id = %id, url = %image.url, %reason, "Image fetch failed");
        AppError::Internal("Failed to fetch image".to_string())
    };
    let upstream = state
        .http_client
        .get(&image.url)
        .send()
        .await
        .map_err(|e| fetch_failed(e.to_string()))?;
    if !upstream.status().is_success() {
        return Err(fetch_failed(format!("upstream status {}", upstream.status())));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("image/jpeg"));
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| fetch_failed(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static(IMAGE_CACHE_CONTROL)),
        ],
        bytes,
    )
        .into_response())
}
