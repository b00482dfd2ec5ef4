// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-round conversation dispatch.

use std::sync::Arc;

use tracing::debug;

use chime_core::types::{Instruction, TranscriptEntry};
use chime_core::{ChimeError, ModelApi};

use crate::action::ActionExecutor;
use crate::tools;

/// Sends a transcript to the model once and executes the returned tool
/// calls. There is no tool loop: results are never fed back for a
/// second round.
pub struct ConversationDispatcher {
    model_api: Option<Arc<dyn ModelApi>>,
}

impl ConversationDispatcher {
    /// `model_api` is `None` when no model credential was configured;
    /// the misconfiguration is surfaced on first dispatch, not at
    /// startup.
    pub fn new(model_api: Option<Arc<dyn ModelApi>>) -> Self {
        Self { model_api }
    }

    /// Run one conversation round.
    ///
    /// The model declining to call any capability is a normal outcome
    /// and a silent no-op.
    ///
    /// # Panics
    ///
    /// Panics when no model credential was configured. A deployment
    /// that triggers conversations without a credential must fail
    /// loudly in operational testing rather than drop them silently.
    pub async fn dispatch(
        &self,
        instruction: &Instruction,
        transcript: &[TranscriptEntry],
        executor: &ActionExecutor,
    ) -> Result<(), ChimeError> {
        let api = self
            .model_api
            .as_ref()
            .expect("openai.api_key is not configured; cannot dispatch conversations");

        let calls = api
            .complete(
                &instruction.model.to_string(),
                transcript,
                &tools::capability_specs(),
            )
            .await?;

        if calls.is_empty() {
            debug!(
                group_id = instruction.group_id,
                "model chose not to respond"
            );
            return Ok(());
        }

        executor.execute_all(&calls).await;
        Ok(())
    }
}
