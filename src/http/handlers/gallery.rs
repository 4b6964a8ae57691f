//! Public gallery read.

use axum::{Json, extract::State};

use super::super::extract::ApiQuery;
use super::super::types::{GalleryQuery, GalleryResponse};
use super::super::{AppError, SharedState, metrics};

/// GET /api/photos[?slug=] - One category, or all of them.
///
/// An unknown slug yields an empty gallery rather than 404.
pub(crate) async fn gallery(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<GalleryQuery>,
) -> Result<Json<GalleryResponse>, AppError> {
    metrics::record_catalog_operation("gallery");
    let slug = query
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty());

    let body = match slug {
        None => GalleryResponse::All {
            galleries: state.catalog.list_categories().await?,
        },
        Some(slug) => match state.catalog.get_category(slug).await? {
            Some(category) => GalleryResponse::One(category),
            None => GalleryResponse::Empty {
                slug: slug.to_string(),
                images: Vec::new(),
            },
        },
    };
    Ok(Json(body))
}
