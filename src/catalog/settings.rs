//! Per-user settings: the Telegram chats the upload pipeline may post to.

use chrono::Utc;
use tracing::info;

use super::Catalog;
use super::types::{TelegramChat, USER_SETTINGS, UserSettings};
use crate::error::{CatalogError, Result};

/// Keep the first chat marked default; mark the first chat if none is.
fn normalize_defaults(chats: &mut [TelegramChat]) {
    let mut seen_default = false;
    for chat in chats.iter_mut() {
        if chat.is_default && !seen_default {
            seen_default = true;
        } else {
            chat.is_default = false;
        }
    }
    if !seen_default && let Some(first) = chats.first_mut() {
        first.is_default = true;
    }
}

fn validate_chat(chat: &TelegramChat) -> Result<()> {
    let blank = [&chat.id, &chat.name, &chat.bot_token, &chat.chat_id]
        .iter()
        .any(|field| field.trim().is_empty());
    if blank {
        return Err(CatalogError::validation(
            "Each chat must have id, name, botToken, and chatId",
        ));
    }
    Ok(())
}

impl Catalog {
    /// Settings for `uid`, empty when none were saved.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the read fails.
    pub async fn get_settings(&self, uid: &str) -> Result<UserSettings> {
        Ok(self
            .store
            .get_as(USER_SETTINGS, uid)
            .await?
            .unwrap_or_default())
    }

    /// Replaces the chat list of `uid`.
    ///
    /// Exactly one chat ends up as the default unless the list is empty.
    ///
    /// # Errors
    ///
    /// `Validation` if any chat has a blank id, name, bot token or chat id.
    pub async fn save_settings(&self, uid: &str, chats: Vec<TelegramChat>) -> Result<UserSettings> {
        chats.iter().try_for_each(validate_chat)?;

        let mut telegram_chats = chats;
        normalize_defaults(&mut telegram_chats);

        let settings = UserSettings {
            telegram_chats,
            updated_at: Some(Utc::now()),
        };
        self.store.put(USER_SETTINGS, uid, &settings).await?;
        info!(%uid, chats = settings.telegram_chats.len(), "Saved settings");
        Ok(settings)
    }

    /// Chat the upload pipeline should send to: the one with `chat_id`
    /// when given, otherwise the default.
    ///
    /// # Errors
    ///
    /// `NotFound` if no chat matches or none are configured.
    pub async fn default_chat(&self, uid: &str, chat_id: Option<&str>) -> Result<TelegramChat> {
        let settings = self.get_settings(uid).await?;
        let chat = match chat_id {
            Some(chat_id) => settings
                .telegram_chats
                .into_iter()
                .find(|chat| chat.id == chat_id || chat.chat_id == chat_id),
            None => settings.telegram_chats.into_iter().find(|chat| chat.is_default),
        };
        chat.ok_or_else(|| CatalogError::not_found("No Telegram chat configured"))
    }
}
