//! HTTP API for the catalog.
//!
//! Public routes serve the gallery and homepage; everything under
//! `/api/images`, `/api/category` and `/api/settings` (plus homepage
//! mutations) requires a bearer token checked by the configured
//! [`TokenVerifier`].
//!
//! # Routes
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/health`, `/metrics` | no |
//! | GET POST PUT DELETE | `/api/images` | yes |
//! | GET PUT PATCH DELETE | `/api/category` | yes |
//! | POST | `/api/category/batch`, `/api/category/rename` | yes |
//! | GET | `/api/photos`, `/api/homepage`, `/api/homepage/images` | no |
//! | GET | `/api/homepage/image/{id}` | no |
//! | POST | `/api/homepage`, `/api/homepage/pins` | yes |
//! | PUT DELETE | `/api/homepage/pins/{photo_id}` | yes |
//! | GET POST | `/api/settings` | yes |

pub mod audit;
mod extract;
mod handlers;
pub mod metrics;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::auth::TokenVerifier;
use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::error::CatalogError;

pub use extract::AdminUser;

/// Everything a handler needs.
pub struct AppState {
    pub catalog: Catalog,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Render handle of the installed Prometheus recorder, if any.
    pub metrics: Option<PrometheusHandle>,
    /// Client for upstream image fetches.
    pub http_client: reqwest::Client,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(catalog: Catalog, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            catalog,
            verifier,
            metrics: None,
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// API error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound {
        message: String,
        missing: Vec<String>,
    },
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    not_found_images: Vec<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::NotFound { message, missing } => ErrorBody {
                error: message,
                not_found_images: missing,
            },
            Self::BadRequest(error)
            | Self::Unauthorized(error)
            | Self::Conflict(error)
            | Self::Internal(error) => ErrorBody {
                error,
                not_found_images: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized(message) => Self::Unauthorized(message),
            CatalogError::Validation(message) => Self::BadRequest(message),
            CatalogError::NotFound { message, missing } => Self::NotFound { message, missing },
            CatalogError::Conflict(message) => Self::Conflict(message),
            CatalogError::Store(err) => {
                error!(error = %format!("{err:#}"), "Store operation failed");
                Self::Internal("Internal server error".to_string())
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Routes with state attached and no middleware.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .route(
            "/api/images",
            get(handlers::images_list)
                .post(handlers::images_create)
                .put(handlers::images_update_alt)
                .delete(handlers::images_delete),
        )
        .route(
            "/api/category",
            get(handlers::category_list)
                .put(handlers::category_update)
                .patch(handlers::category_edit_photo)
                .delete(handlers::category_remove_photo),
        )
        .route("/api/category/batch", post(handlers::category_batch))
        .route("/api/category/rename", post(handlers::category_rename))
        .route("/api/photos", get(handlers::gallery))
        .route(
            "/api/homepage",
            get(handlers::homepage_get).post(handlers::homepage_replace),
        )
        .route("/api/homepage/pins", post(handlers::homepage_add_pin))
        .route(
            "/api/homepage/pins/{photo_id}",
            put(handlers::homepage_move_pin).delete(handlers::homepage_remove_pin),
        )
        .route("/api/homepage/images", get(handlers::homepage_images))
        .route("/api/homepage/image/{id}", get(handlers::homepage_image))
        .route(
            "/api/settings",
            get(handlers::settings_get).post(handlers::settings_save),
        )
        .with_state(state)
}

/// Full application: routes plus request tracing and CORS.
pub fn build_router(state: SharedState, server: &ServerConfig) -> Router {
    let app = router(state).layer(TraceLayer::new_for_http());
    match cors_layer(&server.cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring invalid CORS origin");
                    None
                },
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_masked() {
        let err = AppError::from(CatalogError::from(anyhow::anyhow!("disk full at /var/db")));
        match err {
            AppError::Internal(message) => assert!(!message.contains("disk")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(CatalogError::validation("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CatalogError::conflict("x")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(CatalogError::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = AppError::from(CatalogError::Unauthorized("Invalid token".to_string()));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        match err {
            AppError::Unauthorized(message) => assert_eq!(message, "Invalid token"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cors_layer_only_when_configured() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["https://example.com".to_string()]).is_some());
        assert!(cors_layer(&["*".to_string()]).is_some());
    }
}
