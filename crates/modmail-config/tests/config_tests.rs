// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Modmail configuration system.

use modmail_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_modmail_config() {
    let toml = r#"
[agent]
name = "support-desk"
log_level = "debug"

[gateway]
bot_token = "abc.def.ghi"
server_id = 100200300
ticket_category_id = 400500600
archive_channel_id = 700800900

[tickets]
max_attachment_bytes = 4194304
footer = "Owned and operated by Digital Piano Community"

[counter]
path = "/var/lib/modmail/ticket_counter.json"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "support-desk");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.gateway.bot_token.as_deref(), Some("abc.def.ghi"));
    assert_eq!(config.gateway.server_id, 100200300);
    assert_eq!(config.gateway.ticket_category_id, 400500600);
    assert_eq!(config.gateway.archive_channel_id, 700800900);
    assert_eq!(config.tickets.max_attachment_bytes, 4 * 1024 * 1024);
    assert_eq!(
        config.tickets.footer.as_deref(),
        Some("Owned and operated by Digital Piano Community")
    );
    assert_eq!(config.counter.path, "/var/lib/modmail/ticket_counter.json");
}

/// Empty TOML uses compiled defaults throughout.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "modmail");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.gateway.bot_token.is_none());
    assert_eq!(config.gateway.server_id, 0);
    assert_eq!(config.tickets.max_attachment_bytes, 8 * 1024 * 1024);
    assert!(config.tickets.footer.is_none());
    assert_eq!(config.counter.path, "ticket_counter.json");
}

/// Unknown field in [gateway] section produces an error.
#[test]
fn unknown_field_in_gateway_produces_error() {
    let toml = r#"
[gateway]
bot_tken = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// load_and_validate_str surfaces validation errors, not just parse errors.
#[test]
fn token_without_ids_fails_validation() {
    let toml = r#"
[gateway]
bot_token = "abc.def.ghi"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 3, "one error per missing gateway ID");
}

/// An env-style override maps onto gateway.bot_token via dot notation
/// (NOT gateway.bot.token -- the env provider maps only the section prefix).
#[test]
fn override_maps_to_gateway_section() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };
    use modmail_config::ModmailConfig;

    let toml_content = r#"
[agent]
name = "from-toml"
"#;

    // Simulate MODMAIL_* env vars by merging the mapped dotted keys.
    let config: ModmailConfig = Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("agent.name", "env-bot"))
        .merge(("gateway.bot_token", "from-env"))
        .extract()
        .expect("should merge overrides");

    assert_eq!(config.agent.name, "env-bot");
    assert_eq!(config.gateway.bot_token.as_deref(), Some("from-env"));
}

/// A partial [tickets] section keeps defaults for unspecified keys.
#[test]
fn partial_section_keeps_other_defaults() {
    let toml = r#"
[tickets]
footer = "Support team"
"#;
    let config = load_config_from_str(toml).expect("partial section should parse");
    assert_eq!(config.tickets.footer.as_deref(), Some("Support team"));
    assert_eq!(config.tickets.max_attachment_bytes, 8 * 1024 * 1024);
}
