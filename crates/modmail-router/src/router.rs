// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification and dispatch of inbound events.
//!
//! Every event is classified exactly once. Direct messages resolve, in
//! precedence order, to: dropped (prompt outstanding), forwarded to the open
//! ticket, or a new topic prompt. Channel messages are staff replies, gated
//! on a claim. UI actions hand off to the lifecycle controller.

use std::sync::Arc;

use tracing::{debug, warn};

use modmail_config::ModmailConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::Gateway;
use modmail_core::types::{
    ChannelMessage, ComponentSet, DirectMessage, InboundEvent, LogEntry, LogRole, OutboundMessage,
};
use modmail_lifecycle::{LifecycleController, notices};
use modmail_registry::{ActivePromptSet, Ticket, TicketRegistry};

use crate::attachments::{self, OVERSIZE_NOTICE};

/// Reaction added to acknowledge a forwarded message.
pub const ACK_EMOJI: &str = "\u{2705}";

/// Routes every inbound event to forwarding, prompting, or the lifecycle
/// controller.
pub struct ConversationRouter {
    gateway: Arc<dyn Gateway>,
    registry: Arc<TicketRegistry>,
    prompts: Arc<ActivePromptSet>,
    lifecycle: Arc<LifecycleController>,
    max_attachment_bytes: u64,
    footer: Option<String>,
}

impl ConversationRouter {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        registry: Arc<TicketRegistry>,
        prompts: Arc<ActivePromptSet>,
        lifecycle: Arc<LifecycleController>,
        config: &ModmailConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            prompts,
            lifecycle,
            max_attachment_bytes: config.tickets.max_attachment_bytes,
            footer: config.tickets.footer.clone(),
        }
    }

    /// Classifies and dispatches one inbound event.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<(), ModmailError> {
        match event {
            InboundEvent::DirectMessage(dm) => self.handle_direct(dm).await,
            InboundEvent::ChannelMessage(cm) => self.handle_staff(cm).await,
            InboundEvent::Action(action) => self.lifecycle.handle_action(action).await,
        }
    }

    /// Direct message from an end user.
    async fn handle_direct(&self, dm: DirectMessage) -> Result<(), ModmailError> {
        // 1. A topic prompt is already outstanding: drop the event.
        if self.prompts.contains(dm.author.id) {
            debug!(user = %dm.author.id, "dropping DM, topic prompt outstanding");
            return Ok(());
        }

        // 2. An open ticket exists: forward into its channel.
        if let Some(ticket) = self.registry.find_by_user(dm.author.id) {
            return self.forward_user_message(&dm, &ticket).await;
        }

        // 3. First contact: start the topic prompt. `begin` is atomic, so
        // two racing first-contact events yield exactly one prompt.
        if !self.prompts.begin(dm.author.id) {
            debug!(user = %dm.author.id, "lost prompt race, dropping DM");
            return Ok(());
        }

        let prompt = OutboundMessage::embed(notices::topic_prompt(self.footer.as_deref()))
            .with_components(ComponentSet::TopicMenu);
        if let Err(e) = self.gateway.send_dm(dm.author.id, prompt).await {
            // The prompt never reached the user; clear the entry so their
            // next message can try again.
            self.prompts.finish(dm.author.id);
            warn!(user = %dm.author.id, error = %e, "topic prompt delivery failed");
        }
        Ok(())
    }

    /// Forwards a user's DM into their ticket channel, logging it first.
    async fn forward_user_message(
        &self,
        dm: &DirectMessage,
        ticket: &Ticket,
    ) -> Result<(), ModmailError> {
        let split = attachments::partition(&dm.attachments, self.max_attachment_bytes);

        let entry = LogEntry::Message {
            timestamp: dm.timestamp,
            role: LogRole::User,
            author: dm.author.name.clone(),
            content: dm.content.clone(),
        };
        if let Err(e) = self.registry.append_log(ticket.channel, entry) {
            // A close raced the forward; the ticket is already gone.
            warn!(channel = %ticket.channel, error = %e, "ticket closed before forward");
            return Ok(());
        }

        if split.dropped > 0 {
            self.dm_notice(dm, OVERSIZE_NOTICE).await;
        }

        self.gateway
            .send_channel(
                ticket.channel,
                OutboundMessage::text(format!("{}: {}", dm.author.name, dm.content))
                    .with_forwarded(split.forward),
            )
            .await?;

        if let Err(e) = self.gateway.react(dm.channel, dm.id, ACK_EMOJI).await {
            warn!(error = %e, "acknowledgement reaction failed");
        }
        Ok(())
    }

    async fn dm_notice(&self, dm: &DirectMessage, text: &str) {
        if let Err(e) = self
            .gateway
            .send_dm(dm.author.id, OutboundMessage::text(text))
            .await
        {
            debug!(user = %dm.author.id, error = %e, "notice delivery failed");
        }
    }

    /// Message posted by staff inside a guild channel.
    ///
    /// Messages in channels with no registered ticket are not ours to handle.
    async fn handle_staff(&self, cm: ChannelMessage) -> Result<(), ModmailError> {
        let Some(ticket) = self.registry.find_by_channel(cm.channel) else {
            return Ok(());
        };

        match self.try_forward_staff(&cm, &ticket).await {
            Ok(()) => Ok(()),
            Err(ModmailError::NotClaimed { .. }) => {
                self.gateway
                    .send_channel(
                        cm.channel,
                        OutboundMessage::text(
                            "\u{274C} Please claim this ticket before responding.",
                        ),
                    )
                    .await?;
                Ok(())
            }
            Err(ModmailError::DeliveryRefused { .. }) => {
                // No retry: report once in the channel.
                self.gateway
                    .send_channel(
                        cm.channel,
                        OutboundMessage::text(
                            "\u{274C} Could not send the reply. The user may have DMs disabled.",
                        ),
                    )
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Forwards a staff reply to the ticket's user, gated on a claim.
    async fn try_forward_staff(
        &self,
        cm: &ChannelMessage,
        ticket: &Ticket,
    ) -> Result<(), ModmailError> {
        if self.registry.claim_of(cm.channel).is_none() {
            return Err(ModmailError::NotClaimed {
                channel: cm.channel,
            });
        }

        let split = attachments::partition(&cm.attachments, self.max_attachment_bytes);

        self.registry.append_log(
            cm.channel,
            LogEntry::Message {
                timestamp: cm.timestamp,
                role: LogRole::Staff,
                author: cm.author.name.clone(),
                content: cm.content.clone(),
            },
        )?;

        if split.dropped > 0 {
            self.gateway
                .send_channel(cm.channel, OutboundMessage::text(OVERSIZE_NOTICE))
                .await?;
        }

        self.gateway
            .send_dm(
                ticket.user,
                OutboundMessage::text(cm.content.clone()).with_forwarded(split.forward),
            )
            .await?;

        if let Err(e) = self.gateway.react(cm.channel, cm.id, ACK_EMOJI).await {
            warn!(error = %e, "acknowledgement reaction failed");
        }
        Ok(())
    }
}
