//! Image registry handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::info;

use super::super::extract::{AdminUser, ApiJson, ApiQuery};
use super::super::types::{
    ImageCreatedResponse, ImageIdQuery, ImagesResponse, MessageResponse, UpdateAltRequest,
};
use super::super::{AppError, SharedState, metrics};
use crate::catalog::NewImage;

/// GET /api/images - All images, newest first.
pub(crate) async fn images_list(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<Json<ImagesResponse>, AppError> {
    metrics::record_catalog_operation("images_list");
    let images = state.catalog.list_images().await?;
    Ok(Json(ImagesResponse { images }))
}

/// POST /api/images - Register an uploaded image.
pub(crate) async fn images_create(
    State(state): State<SharedState>,
    AdminUser(identity): AdminUser,
    ApiJson(new): ApiJson<NewImage>,
) -> Result<(StatusCode, Json<ImageCreatedResponse>), AppError> {
    metrics::record_catalog_operation("images_create");
    let image = state.catalog.register_image(&identity.uid, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImageCreatedResponse {
            success: true,
            image,
        }),
    ))
}

/// PUT /api/images - Update an image's alt text.
pub(crate) async fn images_update_alt(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<UpdateAltRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    metrics::record_catalog_operation("images_update_alt");
    state.catalog.update_image_alt(&req.id, req.alt).await?;
    Ok(Json(MessageResponse::ok("Image updated successfully")))
}

/// DELETE /api/images?id= - Delete an image record.
pub(crate) async fn images_delete(
    State(state): State<SharedState>,
    AdminUser(identity): AdminUser,
    ApiQuery(query): ApiQuery<ImageIdQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    metrics::record_catalog_operation("images_delete");
    let existed = state.catalog.delete_image(&query.id).await?;
    if existed {
        info!(image_id = %query.id.trim(), uid = %identity.uid, "Image deleted");
    }
    Ok(Json(MessageResponse::ok("Image deleted successfully")))
}
