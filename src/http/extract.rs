//! Request extractors with JSON error rejections.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query},
    http::request::Parts,
};

use super::audit::{AuditEvent, log_audit_event};
use super::{AppError, SharedState};
use crate::auth::{Identity, bearer_token};
use crate::error::CatalogError;

/// `axum::Json` whose rejection renders as `{"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejection renders as `{"error": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct ApiQuery<T>(pub T);

/// `axum::extract::Path` whose rejection renders as `{"error": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct ApiPath<T>(pub T);

/// Caller authenticated with a valid bearer token.
///
/// Rejects with 401 and logs an audit event otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let path = parts.uri.path().to_string();

        let Some(token) = bearer_token(&parts.headers) else {
            log_audit_event(AuditEvent::AuthFailure {
                remote_addr,
                path,
                reason: "missing bearer token",
            });
            return Err(CatalogError::Unauthorized("Unauthorized".to_string()).into());
        };

        match state.verifier.verify(token).await {
            Some(identity) => {
                log_audit_event(AuditEvent::AuthSuccess {
                    remote_addr,
                    uid: identity.uid.clone(),
                });
                Ok(Self(identity))
            },
            None => {
                log_audit_event(AuditEvent::AuthFailure {
                    remote_addr,
                    path,
                    reason: "invalid token",
                });
                Err(CatalogError::Unauthorized("Invalid token".to_string()).into())
            },
        }
    }
}
