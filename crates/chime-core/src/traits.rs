// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the pipeline and its collaborators.
//!
//! All traits use `#[async_trait]` and are held as `Arc<dyn ...>` so the
//! pipeline can be wired with the real adapters in production and with
//! in-memory fakes in tests.

use async_trait::async_trait;

use crate::error::ChimeError;
use crate::types::{
    Group, Instruction, InstructionDefaults, NewMessage, SentMessage, StoredMessage, ToolCall,
    ToolSpec, TranscriptEntry, User,
};

/// Narrow interface over the durable message store.
///
/// The store owns users, groups, instructions, and messages; the
/// pipeline only reads and appends through these operations and never
/// deletes.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or update a user by external id.
    async fn upsert_user(&self, user: &User) -> Result<(), ChimeError>;

    /// Insert or update a group by external id.
    async fn upsert_group(&self, group: &Group) -> Result<(), ChimeError>;

    /// Fetch a group by external id.
    async fn get_group(&self, group_id: i64) -> Result<Option<Group>, ChimeError>;

    /// Replace the full admin set of a group. Users must already exist.
    async fn replace_admins(&self, group_id: i64, admin_ids: &[i64]) -> Result<(), ChimeError>;

    /// Fetch the group's instruction row, creating it from `defaults`
    /// when absent.
    async fn ensure_instruction(
        &self,
        group_id: i64,
        defaults: &InstructionDefaults,
    ) -> Result<Instruction, ChimeError>;

    /// Append a message row. Messages are never mutated or deleted.
    async fn insert_message(&self, message: &NewMessage) -> Result<(), ChimeError>;

    /// The `limit` most recent messages for a group, most-recent-first,
    /// with sender and one level of reply context resolved.
    async fn recent_messages(
        &self,
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, ChimeError>;
}

/// Per-group counter of messages accumulated since the last trigger.
///
/// Atomicity across concurrent increments for the same group is
/// delegated entirely to the backing cache; the pipeline takes no lock
/// of its own.
#[async_trait]
pub trait TriggerCounter: Send + Sync {
    /// Atomically increment the group's counter and return the new
    /// value. The counter is created at 1 when absent.
    async fn increment(&self, group_id: i64) -> Result<i64, ChimeError>;

    /// Atomically subtract `amount` and return the remaining value.
    ///
    /// A negative result indicates mismatched bookkeeping in the caller
    /// and is reported, not silently corrected.
    async fn decrement_by(&self, group_id: i64, amount: i64) -> Result<i64, ChimeError>;
}

/// Black-box chat-completion endpoint.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Request one completion round and return the tool calls of the
    /// first choice. An empty vector means the model chose not to act.
    async fn complete(
        &self,
        model: &str,
        transcript: &[TranscriptEntry],
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolCall>, ChimeError>;
}

/// Outbound chat sends, already bound to a transport.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Send `text` into `chat_id`, optionally as a threaded reply to an
    /// external message id. Fire-and-forget: there is no undo.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<SentMessage, ChimeError>;
}
