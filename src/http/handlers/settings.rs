//! Per-user settings handlers.

use axum::{Json, extract::State};

use super::super::extract::{AdminUser, ApiJson};
use super::super::types::{MessageResponse, SaveSettingsRequest, SettingsResponse};
use super::super::{AppError, SharedState, metrics};
use crate::error::CatalogError;

/// GET /api/settings - Telegram chats of the caller.
pub(crate) async fn settings_get(
    State(state): State<SharedState>,
    AdminUser(identity): AdminUser,
) -> Result<Json<SettingsResponse>, AppError> {
    metrics::record_catalog_operation("settings_get");
    let settings = state.catalog.get_settings(&identity.uid).await?;
    Ok(Json(SettingsResponse {
        telegram_chats: settings.telegram_chats,
    }))
}

/// POST /api/settings - Replace the caller's Telegram chats.
pub(crate) async fn settings_save(
    State(state): State<SharedState>,
    AdminUser(identity): AdminUser,
    ApiJson(req): ApiJson<SaveSettingsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    metrics::record_catalog_operation("settings_save");
    let telegram_chats = req
        .telegram_chats
        .ok_or_else(|| CatalogError::validation("telegramChats must be an array"))?;
    state
        .catalog
        .save_settings(&identity.uid, telegram_chats)
        .await?;
    Ok(Json(MessageResponse::ok("Settings saved successfully")))
}
