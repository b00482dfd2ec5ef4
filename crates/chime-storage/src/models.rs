// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `chime-core::types` for use across
//! trait boundaries. This module re-exports them for convenience within
//! the storage crate.

pub use chime_core::types::{
    Group, Instruction, InstructionDefaults, NewMessage, ReplyContext, StoredMessage, User,
};
