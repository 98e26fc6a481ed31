// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./modmail.toml` > `~/.config/modmail/modmail.toml`
//! > `/etc/modmail/modmail.toml` with environment variable overrides via the
//! `MODMAIL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ModmailConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/modmail/modmail.toml` (system-wide)
/// 3. `~/.config/modmail/modmail.toml` (user XDG config)
/// 4. `./modmail.toml` (local directory)
/// 5. `MODMAIL_*` environment variables
pub fn load_config() -> Result<ModmailConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::file("/etc/modmail/modmail.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("modmail/modmail.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("modmail.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ModmailConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ModmailConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MODMAIL_GATEWAY_BOT_TOKEN` must map to
/// `gateway.bot_token`, not `gateway.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("MODMAIL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: MODMAIL_GATEWAY_BOT_TOKEN -> "gateway_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("tickets_", "tickets.", 1)
            .replacen("counter_", "counter.", 1);
        mapped.into()
    })
}
