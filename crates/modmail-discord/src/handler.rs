// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of Discord gateway events into core inbound events.
//!
//! The event hook filters bot authors and foreign guilds, converts messages
//! and component interactions into channel-agnostic [`InboundEvent`]s, and
//! forwards them to the adapter's inbound queue.

use std::str::FromStr;

use serenity::all::{
    ComponentInteractionDataKind, Context, CreateInteractionResponse, EventHandler, Interaction,
    Message, Ready,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use modmail_core::types::{
    Attachment, ChannelId, ChannelMessage, DirectMessage, InboundEvent, MessageId, TicketAction,
    Topic, UserRef,
};

use crate::ui::{CLAIM_BUTTON_ID, CLOSE_BUTTON_ID, TOPIC_MENU_ID};

/// Serenity event handler feeding the adapter's inbound queue.
pub struct EventHook {
    tx: mpsc::Sender<InboundEvent>,
    server_id: u64,
}

impl EventHook {
    pub fn new(tx: mpsc::Sender<InboundEvent>, server_id: u64) -> Self {
        Self { tx, server_id }
    }

    async fn forward(&self, event: InboundEvent) {
        if self.tx.send(event).await.is_err() {
            warn!("inbound queue closed, dropping event");
        }
    }
}

#[serenity::async_trait]
impl EventHandler for EventHook {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Discord gateway connected");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match classify_message(&msg, self.server_id) {
            Some(event) => self.forward(event).await,
            None => {
                debug!(channel = msg.channel_id.get(), "ignoring out-of-scope message");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };

        let select_values: Vec<String> = match &component.data.kind {
            ComponentInteractionDataKind::StringSelect { values } => values.clone(),
            _ => Vec::new(),
        };

        let action = component_action(
            &component.data.custom_id,
            &select_values,
            UserRef::new(component.user.id.get(), component.user.name.clone()),
            ChannelId(component.channel_id.get()),
        );

        // Acknowledge so the interaction never shows as failed; the
        // lifecycle's notices arrive as regular messages.
        if let Err(e) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            debug!(error = %e, "interaction acknowledgement failed");
        }

        match action {
            Some(action) => self.forward(InboundEvent::Action(action)).await,
            None => {
                debug!(
                    custom_id = component.data.custom_id.as_str(),
                    "ignoring unrecognized component interaction"
                );
            }
        }
    }
}

/// Classifies a Discord message as a DM, a staff channel message in the
/// configured server, or out of scope (`None`).
pub fn classify_message(msg: &Message, server_id: u64) -> Option<InboundEvent> {
    let author = UserRef::new(msg.author.id.get(), msg.author.name.clone());
    let attachments = convert_attachments(&msg.attachments);
    let timestamp = chrono::Utc::now();

    match msg.guild_id {
        None => Some(InboundEvent::DirectMessage(DirectMessage {
            id: MessageId(msg.id.get()),
            channel: ChannelId(msg.channel_id.get()),
            author,
            content: msg.content.clone(),
            attachments,
            timestamp,
        })),
        Some(guild) if guild.get() == server_id => {
            Some(InboundEvent::ChannelMessage(ChannelMessage {
                id: MessageId(msg.id.get()),
                channel: ChannelId(msg.channel_id.get()),
                author,
                content: msg.content.clone(),
                attachments,
                timestamp,
            }))
        }
        Some(_) => None,
    }
}

/// Maps a component interaction onto a lifecycle action.
///
/// Unknown custom IDs and malformed topic values return `None`.
pub fn component_action(
    custom_id: &str,
    select_values: &[String],
    user: UserRef,
    channel: ChannelId,
) -> Option<TicketAction> {
    match custom_id {
        TOPIC_MENU_ID => {
            let value = select_values.first()?;
            match Topic::from_str(value) {
                Ok(topic) => Some(TicketAction::TopicSelected { user, topic }),
                Err(_) => {
                    warn!(value = value.as_str(), "unknown topic value in selection");
                    None
                }
            }
        }
        CLAIM_BUTTON_ID => Some(TicketAction::Claim {
            channel,
            staff: user,
        }),
        CLOSE_BUTTON_ID => Some(TicketAction::Close {
            channel,
            staff: user,
        }),
        _ => None,
    }
}

/// Converts Discord attachments to core attachment metadata.
pub fn convert_attachments(attachments: &[serenity::all::Attachment]) -> Vec<Attachment> {
    attachments
        .iter()
        .map(|a| Attachment {
            filename: a.filename.clone(),
            size_bytes: u64::from(a.size),
            url: a.url.clone(),
        })
        .collect()
}
