//! Category handlers: assignment, batch moves, rename, reorder and
//! per-photo edits.

use axum::{Json, extract::State};

use super::super::extract::{AdminUser, ApiJson, ApiQuery};
use super::super::types::{
    AssignResponse, BatchAssignRequest, BatchAssignResponse, CategoriesResponse, CategoryCommand,
    CategoryUpdateResponse, EditPhotoRequest, MessageResponse, RemovePhotoQuery, RemovePhotoResponse, RenameRequest,
    RenameResponse,
};
use super::super::{AppError, SharedState, metrics};
use crate::catalog::{AssignCategory, AssignOutcome, BatchAssign, PhotoPatch};

/// GET /api/category - All categories, most recently updated first.
pub(crate) async fn category_list(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<Json<CategoriesResponse>, AppError> {
    metrics::record_catalog_operation("category_list");
    let categories = state.catalog.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// PUT /api/category - Assign one image, or reorder a category.
pub(crate) async fn category_update(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(command): ApiJson<CategoryCommand>,
) -> Result<Json<CategoryUpdateResponse>, AppError> {
    let body = match command {
        CategoryCommand::Assign { id, slug, variant } => {
            metrics::record_catalog_operation("category_assign");
            let assignment = state
                .catalog
                .assign_category(AssignCategory {
                    image_id: id,
                    slug,
                    variant,
                })
                .await?;
            let message = match (&assignment.slug, assignment.outcome) {
                (Some(slug), AssignOutcome::Updated) => format!("Image updated in {slug}"),
                (Some(slug), _) => format!("Image assigned to {slug}"),
                (None, AssignOutcome::Removed) => "Image removed from its category".to_string(),
                (None, _) => "Image was not in any category".to_string(),
            };
            CategoryUpdateResponse::Assigned(AssignResponse {
                success: true,
                message,
                slug: assignment.slug,
                variant: assignment.variant,
                outcome: assignment.outcome,
            })
        },
        CategoryCommand::Reorder { slug, photos } => {
            metrics::record_catalog_operation("category_reorder");
            state.catalog.reorder_category(&slug, photos).await?;
            CategoryUpdateResponse::Reordered(MessageResponse::ok("Category order updated"))
        },
    };
    Ok(Json(body))
}

/// PATCH /api/category - Edit alt, url or variant of one photo.
pub(crate) async fn category_edit_photo(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<EditPhotoRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    metrics::record_catalog_operation("category_edit_photo");
    let patch = PhotoPatch {
        alt: req.alt,
        url: req.url,
        variant: req.variant,
    };
    state
        .catalog
        .edit_photo(&req.slug, &req.photo_id, patch)
        .await?;
    Ok(Json(MessageResponse::ok("Photo updated")))
}

/// DELETE /api/category?slug=&photoId= - Remove one photo from a category.
pub(crate) async fn category_remove_photo(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<RemovePhotoQuery>,
) -> Result<Json<RemovePhotoResponse>, AppError> {
    metrics::record_catalog_operation("category_remove_photo");
    let category_deleted = state
        .catalog
        .remove_photo(&query.slug, &query.photo_id)
        .await?;
    let message = if category_deleted {
        "Photo removed, category deleted"
    } else {
        "Photo removed from category"
    };
    Ok(Json(RemovePhotoResponse {
        success: true,
        message: message.to_string(),
        category_deleted,
    }))
}

/// POST /api/category/batch - Move many images into one category.
pub(crate) async fn category_batch(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<BatchAssignRequest>,
) -> Result<Json<BatchAssignResponse>, AppError> {
    metrics::record_catalog_operation("category_batch");
    let outcome = state
        .catalog
        .batch_assign(BatchAssign {
            image_ids: req.image_ids,
            slug: req.slug,
            variant: req.variant,
        })
        .await?;
    Ok(Json(BatchAssignResponse {
        success: true,
        message: format!("{} images assigned to {}", outcome.updated, outcome.slug),
        updated_count: outcome.updated,
        added_count: outcome.added,
        created: outcome.created,
    }))
}

/// POST /api/category/rename - Rename a category.
pub(crate) async fn category_rename(
    State(state): State<SharedState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<RenameRequest>,
) -> Result<Json<RenameResponse>, AppError> {
    metrics::record_catalog_operation("category_rename");
    let category = state
        .catalog
        .rename_category(&req.old_slug, &req.new_slug)
        .await?;
    Ok(Json(RenameResponse {
        success: true,
        message: format!("Category renamed to {}", category.slug),
        category,
    }))
}
