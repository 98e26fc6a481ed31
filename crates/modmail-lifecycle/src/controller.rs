// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-ticket lifecycle orchestration.
//!
//! Each ticket moves through: none -> prompting -> open (unclaimed) ->
//! open (claimed) -> closed. The controller drives the transitions triggered
//! by [`TicketAction`] events, coordinating the counter store, the registry,
//! the transcript generator, and the gateway.
//!
//! Delivery policy: every direct-message send is wrapped so a refusal (the
//! user blocking DMs) never aborts the surrounding transition. Registry
//! rejections are reported once to the acting user or staff member and not
//! escalated.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use modmail_config::ModmailConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::{CounterStore, Gateway};
use modmail_core::types::{
    ChannelId, ComponentSet, CreateChannelRequest, OutboundMessage, TicketAction, Topic, UserId,
    UserProfile, UserRef,
};
use modmail_registry::{ActivePromptSet, ClosedTicket, TicketRegistry};

use crate::{notices, transcript};

/// Observable lifecycle state for a user.
///
/// A closed ticket leaves no state behind; `None` covers both "never opened"
/// and "closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    /// No open ticket and no outstanding prompt.
    None,
    /// A topic-selection prompt is outstanding.
    Prompting,
    /// Ticket open, waiting for a staff claim.
    OpenUnclaimed,
    /// Ticket open and claimed.
    OpenClaimed,
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketState::None => write!(f, "none"),
            TicketState::Prompting => write!(f, "prompting"),
            TicketState::OpenUnclaimed => write!(f, "open/unclaimed"),
            TicketState::OpenClaimed => write!(f, "open/claimed"),
        }
    }
}

/// Drives ticket creation, claiming, and closing.
pub struct LifecycleController {
    gateway: Arc<dyn Gateway>,
    registry: Arc<TicketRegistry>,
    prompts: Arc<ActivePromptSet>,
    counter: Arc<dyn CounterStore>,
    archive_channel: ChannelId,
    footer: Option<String>,
}

impl LifecycleController {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        registry: Arc<TicketRegistry>,
        prompts: Arc<ActivePromptSet>,
        counter: Arc<dyn CounterStore>,
        config: &ModmailConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            prompts,
            counter,
            archive_channel: ChannelId(config.gateway.archive_channel_id),
            footer: config.tickets.footer.clone(),
        }
    }

    /// Returns the lifecycle state of a user, derived from the prompt set
    /// and the registry.
    pub fn state_of(&self, user: UserId) -> TicketState {
        if let Some(ticket) = self.registry.find_by_user(user) {
            if self.registry.claim_of(ticket.channel).is_some() {
                TicketState::OpenClaimed
            } else {
                TicketState::OpenUnclaimed
            }
        } else if self.prompts.contains(user) {
            TicketState::Prompting
        } else {
            TicketState::None
        }
    }

    /// Dispatches a lifecycle action to the matching transition.
    pub async fn handle_action(&self, action: TicketAction) -> Result<(), ModmailError> {
        match action {
            TicketAction::TopicSelected { user, topic } => self.open_ticket(user, topic).await,
            TicketAction::Claim { channel, staff } => self.claim(channel, staff).await,
            TicketAction::Close { channel, staff } => self.close(channel, staff).await,
        }
    }

    fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Sends a direct message, swallowing failures.
    ///
    /// A refused delivery (the user blocked DMs) or a transient gateway
    /// failure to one recipient must never abort the surrounding transition.
    async fn dm_best_effort(&self, user: UserId, msg: OutboundMessage) {
        match self.gateway.send_dm(user, msg).await {
            Ok(_) => {}
            Err(ModmailError::DeliveryRefused { .. }) => {
                debug!(user = %user, "direct message refused, continuing");
            }
            Err(e) => {
                warn!(user = %user, error = %e, "direct message failed, continuing");
            }
        }
    }

    /// `prompting -> open (unclaimed)`: the user completed topic selection.
    ///
    /// Allocates a ticket number, creates the private channel, registers the
    /// ticket, and notifies both sides. A channel-creation failure aborts
    /// with no registry mutation; a lost duplicate race after the channel
    /// exists tears the channel back down.
    async fn open_ticket(&self, user: UserRef, topic: Topic) -> Result<(), ModmailError> {
        // Selection completed: the prompt is no longer outstanding,
        // whatever happens next.
        self.prompts.finish(user.id);

        if self.registry.find_by_user(user.id).is_some() {
            debug!(user = %user.id, "rejected topic selection, ticket already open");
            self.dm_best_effort(
                user.id,
                OutboundMessage::text("\u{274C} You already have an open ticket."),
            )
            .await;
            return Ok(());
        }

        let number = self.counter.next().await?;

        let request = CreateChannelRequest {
            name: format!("ticket-{number}"),
            requester: user.id,
            topic,
        };
        let channel = match self.gateway.create_ticket_channel(request).await {
            Ok(channel) => channel,
            Err(e) => {
                error!(user = %user.id, error = %e, "ticket channel creation failed");
                self.dm_best_effort(
                    user.id,
                    OutboundMessage::text(
                        "\u{274C} We could not open your ticket. Please try again later.",
                    ),
                )
                .await;
                return Err(e);
            }
        };

        match self
            .registry
            .open_ticket(user.id, channel, number, topic, Utc::now())
        {
            Ok(_) => {}
            Err(ModmailError::DuplicateTicket { .. }) => {
                // Lost a creation race after the channel already existed:
                // tear the channel back down so nothing is orphaned.
                if let Err(e) = self.gateway.delete_channel(channel).await {
                    warn!(channel = %channel, error = %e, "failed to remove channel after lost race");
                }
                self.dm_best_effort(
                    user.id,
                    OutboundMessage::text("\u{274C} You already have an open ticket."),
                )
                .await;
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        info!(
            user = %user.id,
            channel = %channel,
            number = %number,
            topic = %topic,
            "ticket opened"
        );

        self.dm_best_effort(
            user.id,
            OutboundMessage::embed(notices::ticket_created(topic, self.footer())),
        )
        .await;

        self.gateway
            .send_channel(
                channel,
                OutboundMessage::embed(notices::action_panel(&user, topic))
                    .with_components(ComponentSet::TicketActions),
            )
            .await?;

        Ok(())
    }

    /// `open (unclaimed) -> open (claimed)`: a staff member claimed the
    /// ticket. A losing claim is denied with an explicit notice naming the
    /// holder; nothing mutates on denial.
    async fn claim(&self, channel: ChannelId, staff: UserRef) -> Result<(), ModmailError> {
        match self.registry.claim(channel, &staff, Utc::now()) {
            Ok(record) => {
                info!(channel = %channel, staff = %staff.id, "ticket claimed");

                if let Some(ticket) = self.registry.find_by_channel(channel) {
                    self.dm_best_effort(
                        ticket.user,
                        OutboundMessage::embed(notices::staff_assigned(
                            &record.staff_name,
                            self.footer(),
                        )),
                    )
                    .await;
                }

                self.gateway
                    .send_channel(
                        channel,
                        OutboundMessage::text(format!(
                            "**{}** has claimed this ticket.",
                            staff.name
                        )),
                    )
                    .await?;
                Ok(())
            }
            Err(ModmailError::AlreadyClaimed { holder_name, .. }) => {
                debug!(channel = %channel, staff = %staff.id, "claim denied, already held");
                self.gateway
                    .send_channel(
                        channel,
                        OutboundMessage::text(format!(
                            "\u{274C} This ticket has already been claimed by **{holder_name}**."
                        )),
                    )
                    .await?;
                Ok(())
            }
            Err(ModmailError::UnknownChannel { .. }) => {
                self.gateway
                    .send_channel(
                        channel,
                        OutboundMessage::text("\u{274C} This channel is not a ticket channel."),
                    )
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `open -> closed`: tears the ticket down.
    ///
    /// A claim is not required to close. The registry entry is removed
    /// atomically first; transcript delivery and channel deletion follow
    /// outside any lock. An archive delivery failure is surfaced in the
    /// channel but does not block teardown.
    async fn close(&self, channel: ChannelId, staff: UserRef) -> Result<(), ModmailError> {
        let ClosedTicket { ticket, claim, log } = match self.registry.close_ticket(channel) {
            Ok(closed) => closed,
            Err(ModmailError::UnknownChannel { .. }) => {
                self.gateway
                    .send_channel(
                        channel,
                        OutboundMessage::text("\u{274C} This channel is not a ticket channel."),
                    )
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(
            channel = %channel,
            number = %ticket.number,
            staff = %staff.id,
            claimed = claim.is_some(),
            entries = log.len(),
            "closing ticket"
        );

        let requester = match self.gateway.user_profile(ticket.user).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user = %ticket.user, error = %e, "profile lookup failed, using bare id");
                UserProfile {
                    id: ticket.user,
                    name: ticket.user.to_string(),
                }
            }
        };

        let file = transcript::as_file(&ticket, &requester, &log);

        if let Err(e) = self
            .gateway
            .send_channel(
                self.archive_channel,
                OutboundMessage::embed(notices::archive_transcript(ticket.number))
                    .with_file(file.clone()),
            )
            .await
        {
            warn!(error = %e, "transcript archive delivery failed");
            self.gateway
                .send_channel(
                    channel,
                    OutboundMessage::text(
                        "\u{26A0} The transcript could not be delivered to the archive.",
                    ),
                )
                .await
                .ok();
        }

        self.dm_best_effort(
            ticket.user,
            OutboundMessage::embed(notices::user_transcript(ticket.number, self.footer()))
                .with_file(file),
        )
        .await;
        self.dm_best_effort(
            ticket.user,
            OutboundMessage::embed(notices::ticket_closed(self.footer())),
        )
        .await;

        self.gateway.delete_channel(channel).await?;
        Ok(())
    }
}
