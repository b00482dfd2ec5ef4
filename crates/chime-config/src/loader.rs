// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./chime.toml` > `~/.config/chime/chime.toml`
//! > `/etc/chime/chime.toml`, with environment variable overrides via the
//! `CHIME_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChimeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chime/chime.toml` (system-wide)
/// 3. `~/.config/chime/chime.toml` (user XDG config)
/// 4. `./chime.toml` (local directory)
/// 5. `CHIME_*` environment variables
pub fn load_config() -> Result<ChimeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChimeConfig::default()))
        .merge(Toml::file("/etc/chime/chime.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chime/chime.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("chime.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ChimeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChimeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChimeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChimeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-bearing
/// key names stay intact: `CHIME_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("CHIME_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("redis_", "redis.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("instruction_", "instruction.", 1);
        mapped.into()
    })
}
