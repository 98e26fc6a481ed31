// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord gateway adapter for the Modmail ticket bot.
//!
//! Implements [`Gateway`] via serenity: a shard connection feeds inbound
//! events into an mpsc queue, and the outbound operations (DMs, channel
//! sends, channel management, reactions) go through the REST client.

pub mod handler;
pub mod ui;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serenity::all::{
    ChannelType, CreateChannel, GatewayIntents, PermissionOverwrite, PermissionOverwriteType,
    Permissions, ReactionType, ShardManager,
};
use serenity::http::{Http, HttpError};
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId, MessageId as DiscordMessageId,
    RoleId, UserId as DiscordUserId,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use modmail_config::model::GatewayConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::Gateway;
use modmail_core::types::{
    ChannelId, CreateChannelRequest, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    UserId, UserProfile,
};

/// Discord JSON error code for "Cannot send messages to this user".
const CANNOT_MESSAGE_USER: isize = 50007;

/// Discord gateway adapter implementing [`Gateway`].
///
/// Connects via serenity's shard runner, filters events to the configured
/// server, and delivers responses through the REST client.
pub struct DiscordGateway {
    http: Arc<Http>,
    token: String,
    config: GatewayConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    shard_manager: Option<Arc<ShardManager>>,
    run_handle: Option<tokio::task::JoinHandle<()>>,
    bot_user: OnceLock<DiscordUserId>,
}

impl DiscordGateway {
    /// Creates a new Discord gateway adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: GatewayConfig) -> Result<Self, ModmailError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ModmailError::Config("gateway.bot_token is required for the Discord gateway".into())
        })?;
        if token.is_empty() {
            return Err(ModmailError::Config(
                "gateway.bot_token cannot be empty".into(),
            ));
        }

        let http = Arc::new(Http::new(token));
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            http,
            token: token.to_string(),
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            shard_manager: None,
            run_handle: None,
            bot_user: OnceLock::new(),
        })
    }

    /// Starts the shard connection and the inbound event feed.
    pub async fn connect(&mut self) -> Result<(), ModmailError> {
        if self.run_handle.is_some() {
            return Ok(()); // Already connected
        }

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let hook = handler::EventHook::new(self.inbound_tx.clone(), self.config.server_id);
        let mut client = serenity::Client::builder(&self.token, intents)
            .event_handler(hook)
            .await
            .map_err(|e| upstream("failed to build Discord client", e))?;

        self.shard_manager = Some(client.shard_manager.clone());

        info!(server = self.config.server_id, "starting Discord shard connection");
        let handle = tokio::spawn(async move {
            if let Err(e) = client.start().await {
                warn!(error = %e, "Discord client stopped");
            }
        });
        self.run_handle = Some(handle);
        Ok(())
    }

    /// Resolves (and caches) the bot's own user ID, needed for channel
    /// permission overwrites.
    async fn bot_user(&self) -> Result<DiscordUserId, ModmailError> {
        if let Some(id) = self.bot_user.get() {
            return Ok(*id);
        }
        let me = self
            .http
            .get_current_user()
            .await
            .map_err(|e| upstream("failed to resolve bot identity", e))?;
        let _ = self.bot_user.set(me.id);
        Ok(me.id)
    }
}

fn upstream(message: &str, e: serenity::Error) -> ModmailError {
    ModmailError::Upstream {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// True if the error is Discord refusing a DM to this user (blocked DMs).
fn is_dm_refusal(err: &serenity::Error) -> bool {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = err {
        response.error.code == CANNOT_MESSAGE_USER
    } else {
        false
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    fn name(&self) -> &str {
        "discord"
    }

    async fn receive(&self) -> Result<InboundEvent, ModmailError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ModmailError::Upstream {
            message: "Discord inbound queue closed".into(),
            source: None,
        })
    }

    async fn send_dm(
        &self,
        user: UserId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError> {
        let builder = ui::build_message(&self.http, &msg).await?;

        let dm = DiscordUserId::new(user.0)
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| {
                if is_dm_refusal(&e) {
                    ModmailError::DeliveryRefused {
                        user,
                        source: Some(Box::new(e)),
                    }
                } else {
                    upstream("failed to open DM channel", e)
                }
            })?;

        let sent = dm.id.send_message(&self.http, builder).await.map_err(|e| {
            if is_dm_refusal(&e) {
                ModmailError::DeliveryRefused {
                    user,
                    source: Some(Box::new(e)),
                }
            } else {
                upstream("failed to send DM", e)
            }
        })?;

        Ok(MessageId(sent.id.get()))
    }

    async fn send_channel(
        &self,
        channel: ChannelId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError> {
        let builder = ui::build_message(&self.http, &msg).await?;
        let sent = DiscordChannelId::new(channel.0)
            .send_message(&self.http, builder)
            .await
            .map_err(|e| upstream("failed to send channel message", e))?;
        Ok(MessageId(sent.id.get()))
    }

    async fn create_ticket_channel(
        &self,
        request: CreateChannelRequest,
    ) -> Result<ChannelId, ModmailError> {
        let guild = GuildId::new(self.config.server_id);
        let bot_user = self.bot_user().await?;

        // Hide the channel from everyone, grant the requester read-only
        // access, and keep full access for the bot itself.
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(self.config.server_id)),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::SEND_MESSAGES,
                kind: PermissionOverwriteType::Member(DiscordUserId::new(request.requester.0)),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(bot_user),
            },
        ];

        let builder = CreateChannel::new(request.name.clone())
            .kind(ChannelType::Text)
            .category(DiscordChannelId::new(self.config.ticket_category_id))
            .permissions(overwrites)
            .audit_log_reason("Ticket opened");

        let created = guild
            .create_channel(&self.http, builder)
            .await
            .map_err(|e| upstream("failed to create ticket channel", e))?;

        debug!(
            channel = created.id.get(),
            name = request.name.as_str(),
            "ticket channel created"
        );
        Ok(ChannelId(created.id.get()))
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ModmailError> {
        DiscordChannelId::new(channel.0)
            .delete(&self.http)
            .await
            .map_err(|e| upstream("failed to delete ticket channel", e))?;
        Ok(())
    }

    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ModmailError> {
        self.http
            .create_reaction(
                DiscordChannelId::new(channel.0),
                DiscordMessageId::new(message.0),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(|e| upstream("failed to add reaction", e))
    }

    async fn user_profile(&self, user: UserId) -> Result<UserProfile, ModmailError> {
        let fetched = self
            .http
            .get_user(DiscordUserId::new(user.0))
            .await
            .map_err(|e| upstream("failed to fetch user", e))?;
        Ok(UserProfile {
            id: user,
            name: fetched.tag(),
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Discord API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        debug!("Discord gateway shutting down");
        if let Some(manager) = &self.shard_manager {
            manager.shutdown_all().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = GatewayConfig::default();
        assert!(DiscordGateway::new(config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = GatewayConfig {
            bot_token: Some(String::new()),
            ..GatewayConfig::default()
        };
        assert!(DiscordGateway::new(config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = GatewayConfig {
            bot_token: Some("MTA0.fake.token".into()),
            server_id: 1,
            ticket_category_id: 2,
            archive_channel_id: 3,
        };
        let gateway = DiscordGateway::new(config).unwrap();
        assert_eq!(gateway.name(), "discord");
    }
}
