// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the chime group-chat bot.
//!
//! This crate provides the error type, domain types, and the trait seams
//! between the pipeline and its collaborators (message store, trigger
//! counter, model API, chat sender). Every collaborator is injected as a
//! trait object so the pipeline can be exercised with fakes in tests.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ChimeError;
pub use traits::{ChatSender, MessageStore, ModelApi, TriggerCounter};
pub use types::{
    ChatRole, Group, IncomingMessage, Instruction, InstructionDefaults, ModelId, NewMessage,
    ReplyContext, SentMessage, StoredMessage, ToolCall, ToolSpec, TranscriptEntry, User,
};
