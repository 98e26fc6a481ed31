// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serve loop: wires the stack together and pumps gateway events.
//!
//! Each inbound event is handled on its own task so a slow gateway call in
//! one conversation never blocks the others; all shared state sits behind
//! the registry's own locking.

use std::sync::Arc;

use tracing::{debug, info, warn};

use modmail_config::ModmailConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::{CounterStore, Gateway};
use modmail_core::types::HealthStatus;
use modmail_discord::DiscordGateway;
use modmail_lifecycle::LifecycleController;
use modmail_registry::{ActivePromptSet, TicketRegistry};
use modmail_router::ConversationRouter;
use modmail_storage::FileCounterStore;

/// Connects the gateway and runs the event loop until shutdown.
pub async fn run(config: ModmailConfig) -> Result<(), ModmailError> {
    let mut discord = DiscordGateway::new(config.gateway.clone())?;
    discord.connect().await?;
    let gateway: Arc<dyn Gateway> = Arc::new(discord);

    match gateway.health_check().await? {
        HealthStatus::Healthy => info!(gateway = gateway.name(), "gateway healthy"),
        HealthStatus::Unhealthy(reason) => {
            warn!(gateway = gateway.name(), reason = reason.as_str(), "gateway unhealthy")
        }
    }

    let counter: Arc<dyn CounterStore> =
        Arc::new(FileCounterStore::open(&config.counter).await?);
    info!(
        last_issued = counter.last_issued().await?,
        path = config.counter.path.as_str(),
        "counter store ready"
    );

    let registry = Arc::new(TicketRegistry::new());
    let prompts = Arc::new(ActivePromptSet::new());

    let lifecycle = Arc::new(LifecycleController::new(
        gateway.clone(),
        registry.clone(),
        prompts.clone(),
        counter,
        &config,
    ));
    let router = Arc::new(ConversationRouter::new(
        gateway.clone(),
        registry.clone(),
        prompts,
        lifecycle,
        &config,
    ));

    info!(name = config.agent.name.as_str(), "modmail serving");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            event = gateway.receive() => {
                let event = event?;
                let router = router.clone();
                tokio::spawn(async move {
                    if let Err(e) = router.dispatch(event).await {
                        if e.is_rejection() {
                            debug!(error = %e, "event rejected");
                        } else {
                            warn!(error = %e, "event handling failed");
                        }
                    }
                });
            }
        }
    }

    gateway.shutdown().await?;
    info!(open_tickets = registry.open_count(), "modmail stopped");
    Ok(())
}
