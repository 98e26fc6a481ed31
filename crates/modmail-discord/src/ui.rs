// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of core outbound payloads into Discord builders.
//!
//! Embeds, the topic select menu, the claim/close button row, and file
//! attachments are all assembled here so the rest of the workspace never
//! touches platform builders.

use serenity::all::{
    Colour, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed, CreateEmbedFooter,
    CreateMessage, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
};
use serenity::http::Http;
use strum::IntoEnumIterator;

use modmail_core::error::ModmailError;
use modmail_core::types::{Accent, ComponentSet, Embed, OutboundMessage, Topic};

/// Custom ID of the topic select menu.
pub const TOPIC_MENU_ID: &str = "ticket-topic";
/// Custom ID of the claim button.
pub const CLAIM_BUTTON_ID: &str = "ticket-claim";
/// Custom ID of the close button.
pub const CLOSE_BUTTON_ID: &str = "ticket-close";

/// Maps a notice accent onto a Discord role colour.
pub fn accent_colour(accent: Accent) -> Colour {
    match accent {
        Accent::Info => Colour::BLUE,
        Accent::Success => Colour::DARK_GREEN,
        Accent::Warning => Colour::ORANGE,
        Accent::Danger => Colour::RED,
        Accent::Archive => Colour::DARK_PURPLE,
    }
}

/// Builds a Discord embed from a core notice embed.
pub fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(embed.title.clone())
        .description(embed.body.clone())
        .colour(accent_colour(embed.accent));
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer.clone()));
    }
    builder
}

/// Builds the action rows for a component set.
pub fn build_components(components: ComponentSet) -> Vec<CreateActionRow> {
    match components {
        ComponentSet::TopicMenu => {
            let options: Vec<CreateSelectMenuOption> = Topic::iter()
                .map(|topic| {
                    CreateSelectMenuOption::new(topic.to_string(), topic.to_string())
                        .description(topic.description())
                })
                .collect();
            let menu = CreateSelectMenu::new(
                TOPIC_MENU_ID,
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Select your topic...");
            vec![CreateActionRow::SelectMenu(menu)]
        }
        ComponentSet::TicketActions => {
            vec![CreateActionRow::Buttons(vec![
                CreateButton::new(CLAIM_BUTTON_ID)
                    .label("\u{1F64B} Claim")
                    .style(serenity::all::ButtonStyle::Success),
                CreateButton::new(CLOSE_BUTTON_ID)
                    .label("\u{1F512} Close")
                    .style(serenity::all::ButtonStyle::Danger),
            ])]
        }
    }
}

/// Assembles a full Discord message from a core outbound payload.
///
/// Forwarded attachments are re-uploaded by URL, which pulls them from the
/// platform CDN rather than routing bytes through this process.
pub async fn build_message(
    http: &Http,
    msg: &OutboundMessage,
) -> Result<CreateMessage, ModmailError> {
    let mut builder = CreateMessage::new();

    if let Some(text) = &msg.text {
        builder = builder.content(text.clone());
    }
    if let Some(embed) = &msg.embed {
        builder = builder.embed(build_embed(embed));
    }
    if let Some(components) = msg.components {
        builder = builder.components(build_components(components));
    }

    for file in &msg.files {
        builder = builder.add_file(CreateAttachment::bytes(
            file.data.clone(),
            file.filename.clone(),
        ));
    }
    for attachment in &msg.forward_attachments {
        let uploaded = CreateAttachment::url(http, &attachment.url)
            .await
            .map_err(|e| ModmailError::Upstream {
                message: format!("failed to fetch attachment {}: {e}", attachment.filename),
                source: Some(Box::new(e)),
            })?;
        builder = builder.add_file(uploaded);
    }

    Ok(builder)
}
