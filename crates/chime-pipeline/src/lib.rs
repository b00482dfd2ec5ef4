// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message-buffering and conversation-triggering pipeline.
//!
//! One inbound message flows through: persist → increment the group's
//! trigger counter → if the threshold is reached, decrement by exactly
//! the threshold, build the context window, call the model once, and
//! execute the returned actions. Counting is best-effort; persistence
//! is not -- a lost counter never blocks message ingestion.

pub mod action;
pub mod context;
pub mod dispatch;
pub mod tools;

use std::sync::Arc;

use tracing::{debug, info, warn};

use chime_core::types::{IncomingMessage, InstructionDefaults, NewMessage};
use chime_core::{ChatSender, ChimeError, MessageStore, ModelApi, TriggerCounter};

use crate::action::ActionExecutor;
use crate::dispatch::ConversationDispatcher;

/// The pipeline, wired once at startup and shared across update tasks.
///
/// Updates for different groups interleave freely; no per-group lock is
/// taken. Counter atomicity is delegated to the cache backend, so two
/// near-simultaneous messages can both observe a count at the threshold
/// and both fire -- an accepted race.
pub struct MessagePipeline {
    store: Arc<dyn MessageStore>,
    counter: Arc<dyn TriggerCounter>,
    dispatcher: ConversationDispatcher,
    defaults: InstructionDefaults,
    bot_user_id: i64,
}

impl MessagePipeline {
    pub fn new(
        store: Arc<dyn MessageStore>,
        counter: Arc<dyn TriggerCounter>,
        model_api: Option<Arc<dyn ModelApi>>,
        defaults: InstructionDefaults,
        bot_user_id: i64,
    ) -> Self {
        Self {
            store,
            counter,
            dispatcher: ConversationDispatcher::new(model_api),
            defaults,
            bot_user_id,
        }
    }

    /// Handle one inbound chat message.
    ///
    /// Private-chat messages are persisted and stop there; group
    /// messages additionally advance the group's trigger counter and
    /// may fire a conversation round. `sender` is the chat transport
    /// handle the round's actions will be executed through.
    pub async fn handle_message(
        &self,
        incoming: &IncomingMessage,
        sender: Arc<dyn ChatSender>,
    ) -> Result<(), ChimeError> {
        if let Some(user) = &incoming.sender {
            self.store.upsert_user(user).await?;
        }
        if let Some(group) = &incoming.group {
            self.store.upsert_group(group).await?;
        }

        self.store
            .insert_message(&NewMessage {
                message_id: incoming.message_id,
                group_id: incoming.group.as_ref().map(|g| g.group_id),
                user_id: incoming.sender.as_ref().map(|u| u.user_id),
                text: incoming.text.clone(),
                reply_to_message_id: incoming.reply_to_message_id,
            })
            .await?;

        let Some(group) = &incoming.group else {
            return Ok(());
        };

        // The message is durable from here on; a lost counter only
        // delays the next trigger, it never loses messages.
        let count = match self.counter.increment(group.group_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    group_id = group.group_id,
                    error = %e,
                    "trigger counter unavailable, treating as not yet triggered"
                );
                return Ok(());
            }
        };

        let instruction = self
            .store
            .ensure_instruction(group.group_id, &self.defaults)
            .await?;

        if count < instruction.trigger_count {
            debug!(
                group_id = group.group_id,
                count,
                threshold = instruction.trigger_count,
                "below trigger threshold"
            );
            return Ok(());
        }

        // Subtract exactly the threshold, never reset: overflow beyond
        // one threshold carries into the next cycle, so a burst that
        // crosses the threshold twice fires twice.
        self.counter
            .decrement_by(group.group_id, instruction.trigger_count)
            .await?;

        info!(
            group_id = group.group_id,
            count,
            threshold = instruction.trigger_count,
            "trigger threshold reached, dispatching conversation"
        );

        let transcript = context::build_transcript(
            self.store.as_ref(),
            group.group_id,
            &instruction,
            self.bot_user_id,
        )
        .await?;

        let executor = ActionExecutor::new(sender, group.group_id);
        self.dispatcher
            .dispatch(&instruction, &transcript, &executor)
            .await
    }
}
