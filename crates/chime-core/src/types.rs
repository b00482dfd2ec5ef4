// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the chime workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A Telegram user as persisted in the message store.
///
/// Identity is the external Telegram id; one row per distinct user,
/// upserted on first sight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// External Telegram user id.
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl User {
    /// Display name: "last first" when a last name is present, else the
    /// first name alone.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{last} {}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// A Telegram group chat as persisted in the message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// External Telegram chat id (negative for groups and supergroups).
    pub group_id: i64,
    pub title: String,
}

/// Supported chat-completion model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum ModelId {
    #[strum(serialize = "gpt-3.5-turbo")]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[strum(serialize = "gpt-4o")]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-mini")]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "gpt-4.1")]
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[strum(serialize = "gpt-4.1-mini")]
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Gpt4oMini
    }
}

/// Per-group conversation configuration, one-to-one with a group.
///
/// Mutated only by operators through the store; read-only from the
/// pipeline's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub group_id: i64,
    /// Model used for this group's conversation rounds.
    pub model: ModelId,
    /// System prompt prepended to every transcript.
    pub prompt_text: String,
    /// Messages needed to fire a conversation round.
    pub trigger_count: i64,
    /// How many recent messages form the transcript.
    pub context_count: i64,
}

/// Defaults applied when a group's instruction row is lazily created.
#[derive(Debug, Clone)]
pub struct InstructionDefaults {
    pub model: ModelId,
    pub prompt_text: String,
    pub trigger_count: i64,
    pub context_count: i64,
}

impl Default for InstructionDefaults {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            prompt_text: "Help with questions in the chat.".to_string(),
            trigger_count: 10,
            context_count: 10,
        }
    }
}

/// A message row to be appended to the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// External Telegram message id (unique per chat, not globally).
    pub message_id: i64,
    /// Owning group; `None` for private chats.
    pub group_id: Option<i64>,
    /// Sending user; `None` for anonymous/system senders.
    pub user_id: Option<i64>,
    pub text: String,
    /// External id of the replied-to message, when this message is a reply.
    pub reply_to_message_id: Option<i64>,
}

/// One level of inlined reply context on a stored message.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    pub sender: Option<User>,
    pub text: String,
}

/// A stored message as returned by the context window query, with its
/// sender and at most one level of reply context resolved.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub message_id: i64,
    pub text: String,
    pub sender: Option<User>,
    pub reply: Option<ReplyContext>,
}

/// An inbound chat message as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub text: String,
    /// `None` for anonymous/system senders (e.g. channel posts).
    pub sender: Option<User>,
    /// `None` for private chats; private messages are persisted but
    /// never trigger a conversation round.
    pub group: Option<Group>,
    pub reply_to_message_id: Option<i64>,
}

/// Result of a successful outbound send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    /// External id assigned by Telegram to the sent message.
    pub message_id: i64,
}

/// Role tag on a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of the transcript sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    /// Stable per-speaker label: the sender's external id, or the
    /// `"anonymous"` sentinel. Absent on system and assistant entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

impl TranscriptEntry {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            name: None,
            content: content.into(),
        }
    }

    pub fn user(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            name: Some(name.into()),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            name: None,
            content: content.into(),
        }
    }
}

/// Declaration of one capability offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the capability's arguments.
    pub parameters: serde_json::Value,
}

/// A structured action requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as returned by the API.
    pub arguments: String,
}
