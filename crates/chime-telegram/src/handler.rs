// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook-fed update routing.
//!
//! Chat messages are extracted into pipeline types and handed to the
//! message pipeline; join transitions register the group, refresh its
//! admin set, and lazily create its instruction row.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{Chat, ChatMemberUpdated, Update, UpdateKind};
use tracing::{debug, info};

use chime_core::types::{Group, IncomingMessage, InstructionDefaults, User};
use chime_core::{ChatSender, ChimeError, MessageStore};
use chime_pipeline::MessagePipeline;

/// Routes parsed Telegram updates into the pipeline and the store.
pub struct UpdateRouter {
    bot: Bot,
    store: Arc<dyn MessageStore>,
    pipeline: Arc<MessagePipeline>,
    sender: Arc<dyn ChatSender>,
    defaults: InstructionDefaults,
}

impl UpdateRouter {
    pub fn new(
        bot: Bot,
        store: Arc<dyn MessageStore>,
        pipeline: Arc<MessagePipeline>,
        sender: Arc<dyn ChatSender>,
        defaults: InstructionDefaults,
    ) -> Self {
        Self {
            bot,
            store,
            pipeline,
            sender,
            defaults,
        }
    }

    /// Handle one update from the webhook.
    pub async fn handle_update(&self, update: Update) -> Result<(), ChimeError> {
        match update.kind {
            UpdateKind::Message(message) => self.handle_chat_message(&message).await,
            UpdateKind::MyChatMember(member_update) => {
                self.handle_my_chat_member(&member_update).await
            }
            _ => {
                debug!("ignoring unsupported update kind");
                Ok(())
            }
        }
    }

    async fn handle_chat_message(&self, message: &Message) -> Result<(), ChimeError> {
        let Some(incoming) = extract_incoming(message) else {
            debug!(msg_id = message.id.0, "ignoring non-text message");
            return Ok(());
        };
        self.pipeline
            .handle_message(&incoming, self.sender.clone())
            .await
    }

    /// Register a group the moment the bot joins it: upsert the admins
    /// as users, upsert the group, replace the admin set wholesale, and
    /// create the instruction row with configured defaults.
    async fn handle_my_chat_member(&self, update: &ChatMemberUpdated) -> Result<(), ChimeError> {
        if !is_join_transition(update) {
            return Ok(());
        }
        let Some(group) = group_from_chat(&update.chat) else {
            return Ok(());
        };

        info!(
            group_id = group.group_id,
            title = group.title.as_str(),
            "bot joined group, registering"
        );

        let administrators = self
            .bot
            .get_chat_administrators(update.chat.id)
            .await
            .map_err(|e| ChimeError::Channel {
                message: format!("getChatAdministrators failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut admin_ids = Vec::with_capacity(administrators.len());
        for member in &administrators {
            let user = user_from_telegram(&member.user);
            self.store.upsert_user(&user).await?;
            admin_ids.push(user.user_id);
        }

        self.store.upsert_group(&group).await?;
        self.store.replace_admins(group.group_id, &admin_ids).await?;
        self.store
            .ensure_instruction(group.group_id, &self.defaults)
            .await?;
        Ok(())
    }
}

/// Extract a pipeline message from a Telegram message.
///
/// Returns `None` for non-text messages (stickers, photos, service
/// messages), which the bot does not record.
pub fn extract_incoming(message: &Message) -> Option<IncomingMessage> {
    let text = message.text()?.to_string();
    Some(IncomingMessage {
        message_id: message.id.0 as i64,
        text,
        sender: message.from.as_ref().map(user_from_telegram),
        group: group_from_chat(&message.chat),
        reply_to_message_id: message.reply_to_message().map(|reply| reply.id.0 as i64),
    })
}

/// Map a Telegram user into the store's user type.
pub fn user_from_telegram(user: &teloxide::types::User) -> User {
    User {
        user_id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

/// Titled chats (groups, supergroups) map to a stored group; private
/// chats have no title and map to `None`.
pub fn group_from_chat(chat: &Chat) -> Option<Group> {
    chat.title().map(|title| Group {
        group_id: chat.id.0,
        title: title.to_string(),
    })
}

/// True when the update is the bot going from absent to present.
pub fn is_join_transition(update: &ChatMemberUpdated) -> bool {
    !update.old_chat_member.kind.is_present() && update.new_chat_member.kind.is_present()
}
