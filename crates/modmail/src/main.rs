// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modmail - a support ticket bot routing user DMs through staff channels.
//!
//! This is the binary entry point.

mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modmail_config::ModmailConfig;

/// Modmail - a support ticket bot routing user DMs through staff channels.
#[derive(Parser, Debug)]
#[command(name = "modmail", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the gateway and serve tickets.
    Serve,
    /// Show the effective configuration.
    Config,
}

fn init_tracing(config: &ModmailConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_config(config: &ModmailConfig) {
    println!("agent.name = {}", config.agent.name);
    println!("agent.log_level = {}", config.agent.log_level);
    println!(
        "gateway.bot_token = {}",
        if config.gateway.bot_token.is_some() {
            "(set)"
        } else {
            "(unset)"
        }
    );
    println!("gateway.server_id = {}", config.gateway.server_id);
    println!(
        "gateway.ticket_category_id = {}",
        config.gateway.ticket_category_id
    );
    println!(
        "gateway.archive_channel_id = {}",
        config.gateway.archive_channel_id
    );
    println!(
        "tickets.max_attachment_bytes = {}",
        config.tickets.max_attachment_bytes
    );
    println!(
        "tickets.footer = {}",
        config.tickets.footer.as_deref().unwrap_or("(unset)")
    );
    println!("counter.path = {}", config.counter.path);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match modmail_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            modmail_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "serve failed");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => print_config(&config),
        None => println!("modmail: use --help for available commands"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = modmail_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "modmail");
    }
}
