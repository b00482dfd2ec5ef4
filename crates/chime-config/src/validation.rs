// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive counts and well-formed addresses.

use crate::diagnostic::ConfigError;
use crate::model::ChimeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all failures instead of failing fast, so the operator sees
/// every problem in one run.
pub fn validate_config(config: &ChimeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !config.redis.url.starts_with("redis://") && !config.redis.url.starts_with("rediss://") {
        errors.push(ConfigError::Validation {
            message: format!(
                "redis.url must start with redis:// or rediss://, got `{}`",
                config.redis.url
            ),
        });
    }

    if !config.telegram.webhook_path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "telegram.webhook_path must start with `/`, got `{}`",
                config.telegram.webhook_path
            ),
        });
    }

    if config.instruction.trigger_count < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "instruction.trigger_count must be at least 1, got {}",
                config.instruction.trigger_count
            ),
        });
    }

    if config.instruction.context_count < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "instruction.context_count must be at least 1, got {}",
                config.instruction.context_count
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ChimeConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ChimeConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_trigger_count_fails_validation() {
        let mut config = ChimeConfig::default();
        config.instruction.trigger_count = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("trigger_count"))
        ));
    }

    #[test]
    fn bad_redis_scheme_fails_validation() {
        let mut config = ChimeConfig::default();
        config.redis.url = "http://localhost:6379".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("redis.url"))));
    }

    #[test]
    fn webhook_path_without_slash_fails_validation() {
        let mut config = ChimeConfig::default();
        config.telegram.webhook_path = "telegram/webhook".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("webhook_path"))
        ));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = ChimeConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/chime.db".to_string();
        config.instruction.trigger_count = 3;
        assert!(validate_config(&config).is_ok());
    }
}
