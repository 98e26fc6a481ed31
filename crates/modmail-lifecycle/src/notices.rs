// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User- and staff-facing notice embeds for every lifecycle transition.

use modmail_core::types::{Accent, Embed, TicketNumber, Topic, UserRef};

fn footer_opt(footer: Option<&str>) -> Option<String> {
    footer.map(|s| s.to_string())
}

/// First-contact prompt asking the user to pick a topic.
pub fn topic_prompt(footer: Option<&str>) -> Embed {
    Embed::new(
        "\u{1F4E8} Ticket Support",
        "Thank you for reaching out! Please select your topic below to get started.",
        Accent::Info,
    )
    .with_footer(footer_opt(footer))
}

/// Confirmation sent to the user after their ticket is created.
pub fn ticket_created(topic: Topic, footer: Option<&str>) -> Embed {
    Embed::new(
        "\u{1F4E8} Ticket Created",
        format!(
            "Thank you for taking the time to open a ticket. Your request is important to us.\n\n\
             **Topic:** {topic}\n\
             A staff member will assist you shortly. Please have all relevant proof and \
             information ready to share with our team."
        ),
        Accent::Success,
    )
    .with_footer(footer_opt(footer))
}

/// Intro posted in the new ticket channel alongside the claim/close panel.
pub fn action_panel(requester: &UserRef, topic: Topic) -> Embed {
    Embed::new(
        "New ticket",
        format!(
            "**{}** has created a ticket.\n\n**Topic:** {topic}\n\
             Claim the ticket to be able to respond.",
            requester.name
        ),
        Accent::Warning,
    )
}

/// Sent to the user when a staff member claims their ticket.
pub fn staff_assigned(staff_name: &str, footer: Option<&str>) -> Embed {
    Embed::new(
        "\u{1F464} Staff member assigned",
        format!("The staff member **{staff_name}** has claimed this ticket."),
        Accent::Info,
    )
    .with_footer(footer_opt(footer))
}

/// Sent to the user when their ticket is closed.
pub fn ticket_closed(footer: Option<&str>) -> Embed {
    Embed::new(
        "\u{1F512} Ticket Closed",
        "Thank you for reaching out to us. Your request has been resolved.\n\n\
         **Warning:** Answering this message will open a new support request.\n\n\
         **\u{1F4C4} Ticket Log:** You can find a log of your ticket attached.",
        Accent::Danger,
    )
    .with_footer(footer_opt(footer))
}

/// Posted to the archive channel with the transcript attached.
pub fn archive_transcript(number: TicketNumber) -> Embed {
    Embed::new(
        format!("\u{1F4C4} Transcript for Ticket #{number}"),
        format!("Transcript for ticket #{number}."),
        Accent::Archive,
    )
}

/// Sent to the user with their copy of the transcript.
pub fn user_transcript(number: TicketNumber, footer: Option<&str>) -> Embed {
    Embed::new(
        format!("\u{1F4C4} Transcript for Ticket #{number}"),
        "Here is the transcript of your ticket conversation. Thank you!",
        Accent::Success,
    )
    .with_footer(footer_opt(footer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_is_threaded_through() {
        let embed = ticket_created(Topic::Other, Some("Support team"));
        assert_eq!(embed.footer.as_deref(), Some("Support team"));
        let embed = ticket_created(Topic::Other, None);
        assert!(embed.footer.is_none());
    }

    #[test]
    fn action_panel_names_requester_and_topic() {
        let requester = UserRef::new(1, "alice");
        let embed = action_panel(&requester, Topic::BugReport);
        assert!(embed.body.contains("alice"));
        assert!(embed.body.contains("Bug Report"));
    }

    #[test]
    fn closed_notice_warns_about_reopening() {
        let embed = ticket_closed(None);
        assert!(embed.body.contains("will open a new support request"));
    }
}
