// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions adapter for the chime group-chat bot.
//!
//! Exposes [`OpenAiClient`] and its [`ModelApi`] implementation: one
//! tool-calling round per request, returning the first choice's tool
//! calls. The model declining to call anything is a normal outcome, not
//! an error.

pub mod client;
pub mod types;

pub use client::OpenAiClient;

use async_trait::async_trait;
use tracing::debug;

use chime_core::types::{ToolCall, ToolSpec, TranscriptEntry};
use chime_core::{ChimeError, ModelApi};

use crate::types::ChatCompletionRequest;

#[async_trait]
impl ModelApi for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        transcript: &[TranscriptEntry],
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolCall>, ChimeError> {
        let request = ChatCompletionRequest::new(model, transcript, tools);
        let response = self.complete_chat(&request).await?;

        let calls: Vec<ToolCall> = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.tool_calls)
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!(model, tool_calls = calls.len(), "completion round finished");
        Ok(calls)
    }
}
