// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Modmail ticket bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Size threshold above which attachments are dropped instead of forwarded.
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 8 * 1024 * 1024;

/// Top-level Modmail configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values; the
/// gateway section must be filled in before `serve` will connect.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModmailConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Chat-platform connection settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Ticket behavior settings.
    #[serde(default)]
    pub tickets: TicketConfig,

    /// Ticket-number counter persistence settings.
    #[serde(default)]
    pub counter: CounterConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
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
    "modmail".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat-platform connection configuration.
///
/// `bot_token` is the platform credential; the three IDs locate the server,
/// the category ticket channels are created under, and the archive channel
/// transcripts are delivered to. `None`/zero values disable the gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bot credential. `None` disables the gateway connection.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Identity of the staff server.
    #[serde(default)]
    pub server_id: u64,

    /// Category the ticket channels are created under.
    #[serde(default)]
    pub ticket_category_id: u64,

    /// Channel finished transcripts are delivered to.
    #[serde(default)]
    pub archive_channel_id: u64,
}

/// Ticket behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketConfig {
    /// Per-attachment forwarding limit in bytes.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,

    /// Footer line appended to user-facing notice embeds.
    #[serde(default)]
    pub footer: Option<String>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: default_max_attachment_bytes(),
            footer: None,
        }
    }
}

fn default_max_attachment_bytes() -> u64 {
    DEFAULT_MAX_ATTACHMENT_BYTES
}

/// Ticket-number counter persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CounterConfig {
    /// Path of the flat file holding the last-issued ticket number.
    #[serde(default = "default_counter_path")]
    pub path: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            path: default_counter_path(),
        }
    }
}

fn default_counter_path() -> String {
    "ticket_counter.json".to_string()
}
