// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: required gateway IDs when a credential is present, a usable
//! attachment threshold, and a recognized log level.

use crate::diagnostic::ConfigError;
use crate::model::ModmailConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ModmailConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    // A credential without routing identities cannot serve tickets.
    if let Some(token) = config.gateway.bot_token.as_deref() {
        if token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "gateway.bot_token must not be empty when set".to_string(),
            });
        }
        for (key, value) in [
            ("gateway.server_id", config.gateway.server_id),
            ("gateway.ticket_category_id", config.gateway.ticket_category_id),
            ("gateway.archive_channel_id", config.gateway.archive_channel_id),
        ] {
            if value == 0 {
                errors.push(ConfigError::Validation {
                    message: format!("{key} is required when gateway.bot_token is set"),
                });
            }
        }
    }

    if config.tickets.max_attachment_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "tickets.max_attachment_bytes must be greater than zero".to_string(),
        });
    }

    if config.counter.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "counter.path must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
