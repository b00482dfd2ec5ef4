// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for the chime group-chat bot.
//!
//! Provides the bot handle, webhook-fed update routing, and outbound
//! sends with an interception hook that persists every message the bot
//! sends.

pub mod handler;
pub mod outbound;

use chime_config::model::TelegramConfig;
use chime_core::types::User;
use chime_core::ChimeError;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, InputFile};

pub use handler::UpdateRouter;
pub use outbound::{BotSender, RecordedSender};

/// Update kinds the webhook subscribes to.
const ALLOWED_UPDATES: [AllowedUpdate; 2] = [AllowedUpdate::Message, AllowedUpdate::MyChatMember];

/// The Telegram channel: owns the bot handle built from configuration.
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    /// Creates the channel. Requires `config.bot_token` to be set and
    /// non-empty; absence of the token means the chat transport is
    /// disabled and this constructor must not be called.
    pub fn new(config: &TelegramConfig) -> Result<Self, ChimeError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ChimeError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.is_empty() {
            return Err(ChimeError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Returns a clone-friendly reference to the underlying bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Resolve the bot's own identity via `getMe`.
    ///
    /// Called once at startup; the identity tags the bot's transcript
    /// entries and attributes its persisted outbound messages.
    pub async fn fetch_identity(&self) -> Result<User, ChimeError> {
        let me = self.bot.get_me().await.map_err(|e| ChimeError::Channel {
            message: format!("getMe failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(User {
            user_id: me.user.id.0 as i64,
            first_name: me.user.first_name.clone(),
            last_name: me.user.last_name.clone(),
        })
    }
}

/// (Re-)register the webhook with Telegram.
///
/// Subscribes to message and chat-member updates only; an optional
/// public-key certificate is uploaded for self-signed deployments.
pub async fn register_webhook(
    bot: &Bot,
    url: &str,
    certificate_path: Option<&str>,
) -> Result<(), ChimeError> {
    let url = url.parse::<reqwest::Url>().map_err(|e| ChimeError::Channel {
        message: format!("invalid webhook url `{url}`: {e}"),
        source: Some(Box::new(e)),
    })?;

    let request = bot.set_webhook(url).allowed_updates(ALLOWED_UPDATES);
    let request = match certificate_path {
        Some(path) => request.certificate(InputFile::file(path.to_string())),
        None => request,
    };

    request.await.map_err(|e| ChimeError::Channel {
        message: format!("setWebhook failed: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(())
}
