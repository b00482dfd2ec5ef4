// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed actions parsed from model tool calls, and their chat-scoped
//! executor.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use chime_core::types::ToolCall;
use chime_core::ChatSender;

use crate::tools;

/// A model-requested action, as a statically enumerable set.
///
/// Names the model invents that are not in the capability table parse
/// to [`GroupAction::Unknown`] and are skipped, never escalated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    /// Send `text` as a threaded reply to an existing message.
    Reply { message_id: i64, text: String },
    /// Post `text` as a fresh message with no reply link.
    Answer { text: String },
    /// Anything the capability table does not define.
    Unknown { name: String },
}

#[derive(Deserialize)]
struct ReplyArgs {
    message_id: i64,
    text: String,
}

#[derive(Deserialize)]
struct AnswerArgs {
    text: String,
}

impl GroupAction {
    /// Parse a tool call's name and raw JSON argument payload.
    pub fn parse(call: &ToolCall) -> Result<Self, serde_json::Error> {
        match call.name.as_str() {
            tools::REPLY => {
                let args: ReplyArgs = serde_json::from_str(&call.arguments)?;
                Ok(Self::Reply {
                    message_id: args.message_id,
                    text: args.text,
                })
            }
            tools::ANSWER => {
                let args: AnswerArgs = serde_json::from_str(&call.arguments)?;
                Ok(Self::Answer { text: args.text })
            }
            other => Ok(Self::Unknown {
                name: other.to_string(),
            }),
        }
    }
}

/// Executes model-requested actions against one chat.
///
/// The sender handle and chat id are bound per conversation round, so
/// the executor is the runtime capability table: it can only ever send
/// into the chat it was created for.
pub struct ActionExecutor {
    sender: Arc<dyn ChatSender>,
    chat_id: i64,
}

impl ActionExecutor {
    pub fn new(sender: Arc<dyn ChatSender>, chat_id: i64) -> Self {
        Self { sender, chat_id }
    }

    /// Execute every call in model order.
    ///
    /// Each call is handled independently: malformed arguments, unknown
    /// names, and send failures are logged and the remaining calls still
    /// run. Nothing here returns an error.
    pub async fn execute_all(&self, calls: &[ToolCall]) {
        for call in calls {
            self.execute(call).await;
        }
    }

    async fn execute(&self, call: &ToolCall) {
        let action = match GroupAction::parse(call) {
            Ok(action) => action,
            Err(e) => {
                warn!(
                    name = call.name.as_str(),
                    error = %e,
                    "malformed tool call arguments, skipping"
                );
                return;
            }
        };

        match action {
            GroupAction::Reply { message_id, text } => {
                self.send(&text, Some(message_id)).await;
            }
            GroupAction::Answer { text } => {
                self.send(&text, None).await;
            }
            GroupAction::Unknown { name } => {
                debug!(name = name.as_str(), "unknown capability requested, skipping");
            }
        }
    }

    async fn send(&self, text: &str, reply_to: Option<i64>) {
        if text.is_empty() {
            debug!(chat_id = self.chat_id, "empty-text invocation, skipping");
            return;
        }
        if let Err(e) = self.sender.send_message(self.chat_id, text, reply_to).await {
            warn!(chat_id = self.chat_id, error = %e, "outbound send failed");
        }
    }
}
