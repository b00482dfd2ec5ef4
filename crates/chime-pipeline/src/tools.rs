// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability schemas offered to the model.

use chime_core::types::ToolSpec;

/// Capability name: send a threaded reply to a specific message.
pub const REPLY: &str = "reply";

/// Capability name: post a fresh message with no reply link.
pub const ANSWER: &str = "answer";

/// The capability table declared on every conversation round.
pub fn capability_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: REPLY.to_string(),
            description: "send reply to message".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "required": ["message_id", "text"],
                "properties": {
                    "message_id": {"type": "integer"},
                    "text": {"type": "string"}
                }
            }),
        },
        ToolSpec {
            name: ANSWER.to_string(),
            description: "send text answer to chat".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "required": ["text"],
                "properties": {
                    "text": {"type": "string"}
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_capabilities_are_declared() {
        let specs = capability_specs();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["reply", "answer"]);
    }

    #[test]
    fn reply_schema_requires_message_id_and_text() {
        let specs = capability_specs();
        let reply = &specs[0];
        let required = reply.parameters["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "message_id"));
        assert!(required.iter().any(|v| v == "text"));
        assert_eq!(
            reply.parameters["properties"]["message_id"]["type"],
            "integer"
        );
    }
}
