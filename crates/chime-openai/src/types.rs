// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions request/response wire types.

use chime_core::types::{ToolSpec, TranscriptEntry};
use serde::{Deserialize, Serialize};

/// A request to `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,

    /// Ordered, role-tagged conversation entries.
    pub messages: Vec<ChatMessage>,

    /// Tool definitions available for the model to call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// Tool-choice policy; always "auto" when tools are offered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

impl ChatCompletionRequest {
    /// Build a single-round tool-calling request from pipeline types.
    pub fn new(model: &str, transcript: &[TranscriptEntry], tools: &[ToolSpec]) -> Self {
        let tools_present = !tools.is_empty();
        Self {
            model: model.to_string(),
            messages: transcript.iter().map(ChatMessage::from_entry).collect(),
            tools: tools_present.then(|| tools.iter().map(ToolDefinition::from_spec).collect()),
            tool_choice: tools_present.then(|| "auto".to_string()),
        }
    }
}

/// One conversation entry in the API's message format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,

    pub content: String,

    /// Per-speaker label on user entries; the API uses it to keep
    /// speakers apart in multi-party transcripts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn from_entry(entry: &TranscriptEntry) -> Self {
        Self {
            role: entry.role.to_string(),
            content: entry.content.clone(),
            name: entry.name.clone(),
        }
    }
}

/// A tool definition in the API's `{"type": "function", ...}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    fn from_spec(spec: &ToolSpec) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters.clone(),
            },
        }
    }
}

/// The function half of a tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the function's arguments.
    pub parameters: serde_json::Value,
}

/// A full response from the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    /// Requested tool invocations; absent when the model answered with
    /// plain text or chose not to respond.
    #[serde(default)]
    pub tool_calls: Option<Vec<ApiToolCall>>,
}

/// One requested tool invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

/// The function half of a tool invocation. `arguments` is a
/// JSON-encoded string, exactly as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
