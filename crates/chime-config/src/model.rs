// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the chime group-chat bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys
//! are rejected at startup with actionable error messages.

use chime_core::types::{InstructionDefaults, ModelId};
use serde::{Deserialize, Serialize};

/// Top-level chime configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChimeConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Trigger counter cache settings.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Message store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Defaults applied when a group's instruction row is created.
    #[serde(default)]
    pub instruction: InstructionConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "chime".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the chat transport
    /// entirely (no bot instance is constructed).
    #[serde(default)]
    pub bot_token: Option<String>,

    /// URL path the webhook is served and registered under.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Optional public-key certificate uploaded during webhook
    /// registration (self-signed deployments).
    #[serde(default)]
    pub certificate_path: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            webhook_path: default_webhook_path(),
            certificate_path: None,
        }
    }
}

fn default_webhook_path() -> String {
    "/telegram/webhook".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. Absence does not fail startup; the conversation
    /// dispatcher fails hard on first use instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds for completion calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Redis configuration for the trigger counter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

/// Message store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chime").join("chime.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chime.db"))
        .to_string_lossy()
        .into_owned()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8443
}

/// Defaults for lazily created instruction rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionConfig {
    /// Default model for new groups.
    #[serde(default)]
    pub model: ModelId,

    /// Default system prompt for new groups.
    #[serde(default = "default_prompt_text")]
    pub prompt_text: String,

    /// Messages needed to fire a conversation round.
    #[serde(default = "default_trigger_count")]
    pub trigger_count: i64,

    /// How many recent messages form the transcript.
    #[serde(default = "default_context_count")]
    pub context_count: i64,
}

impl Default for InstructionConfig {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            prompt_text: default_prompt_text(),
            trigger_count: default_trigger_count(),
            context_count: default_context_count(),
        }
    }
}

impl InstructionConfig {
    /// Convert into the store-facing defaults struct.
    pub fn as_defaults(&self) -> InstructionDefaults {
        InstructionDefaults {
            model: self.model,
            prompt_text: self.prompt_text.clone(),
            trigger_count: self.trigger_count,
            context_count: self.context_count,
        }
    }
}

fn default_prompt_text() -> String {
    "Help with questions in the chat.".to_string()
}

fn default_trigger_count() -> i64 {
    10
}

fn default_context_count() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ChimeConfig::default();
        assert_eq!(config.agent.name, "chime");
        assert_eq!(config.agent.log_level, "info");
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.telegram.webhook_path, "/telegram/webhook");
        assert_eq!(config.instruction.trigger_count, 10);
        assert_eq!(config.instruction.context_count, 10);
        assert_eq!(config.instruction.model, ModelId::Gpt4oMini);
        assert_eq!(config.gateway.port, 8443);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let toml_str = r#"
[agent]
name = "test"

[telgram]
bot_token = "123:abc"
"#;
        assert!(toml::from_str::<ChimeConfig>(toml_str).is_err());
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[telegram]
bot_tken = "123:abc"
"#;
        assert!(toml::from_str::<ChimeConfig>(toml_str).is_err());
    }

    #[test]
    fn instruction_model_parses_from_api_name() {
        let toml_str = r#"
[instruction]
model = "gpt-3.5-turbo"
trigger_count = 5
"#;
        let config: ChimeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.instruction.model, ModelId::Gpt35Turbo);
        assert_eq!(config.instruction.trigger_count, 5);
        // Untouched keys keep their defaults.
        assert_eq!(config.instruction.context_count, 10);
    }

    #[test]
    fn as_defaults_copies_all_fields() {
        let config = InstructionConfig {
            model: ModelId::Gpt4o,
            prompt_text: "Be terse.".into(),
            trigger_count: 3,
            context_count: 7,
        };
        let defaults = config.as_defaults();
        assert_eq!(defaults.model, ModelId::Gpt4o);
        assert_eq!(defaults.prompt_text, "Be terse.");
        assert_eq!(defaults.trigger_count, 3);
        assert_eq!(defaults.context_count, 7);
    }
}
