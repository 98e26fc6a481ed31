// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialization of a finished conversation log into a plain-text transcript.
//!
//! The artifact is transient: rendered in memory, attached to the archive
//! and user deliveries, and never written to disk.

use modmail_core::types::{FilePayload, LogEntry, TicketNumber, UserProfile, format_timestamp};
use modmail_registry::Ticket;

/// Renders a ticket's final log as a plain-text document.
///
/// A header line identifies the ticket number, requester, and creation time;
/// each log entry follows in arrival order, one per line.
pub fn render(ticket: &Ticket, requester: &UserProfile, log: &[LogEntry]) -> String {
    let mut out = format!(
        "Ticket #{} started with {} ({}) at {}\n",
        ticket.number,
        requester.name,
        requester.id,
        format_timestamp(ticket.created_at),
    );
    for entry in log {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

/// Transcript attachment filename for a ticket.
pub fn filename(number: TicketNumber) -> String {
    format!("Ticket-{number}.txt")
}

/// Renders the transcript as an attachable file payload.
pub fn as_file(ticket: &Ticket, requester: &UserProfile, log: &[LogEntry]) -> FilePayload {
    FilePayload {
        filename: filename(ticket.number),
        data: render(ticket, requester, log).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use modmail_core::types::{ChannelId, LogRole, Topic, UserId};

    fn ts(rfc3339: &str) -> chrono::DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn render_contains_header_and_all_entries_in_order() {
        let created = ts("2026-02-01T10:30:00Z");
        let ticket = Ticket {
            channel: ChannelId(10),
            user: UserId(1),
            number: modmail_core::types::TicketNumber(4),
            topic: Topic::BugReport,
            created_at: created,
        };
        let requester = UserProfile {
            id: UserId(1),
            name: "alice".into(),
        };
        let log = vec![
            LogEntry::Topic {
                timestamp: created,
                topic: Topic::BugReport,
            },
            LogEntry::Message {
                timestamp: ts("2026-02-01T10:31:00Z"),
                role: LogRole::Staff,
                author: "mod".into(),
                content: "What happened?".into(),
            },
            LogEntry::Message {
                timestamp: ts("2026-02-01T10:32:00Z"),
                role: LogRole::User,
                author: "alice".into(),
                content: "It crashed".into(),
            },
        ];

        let text = render(&ticket, &requester, &log);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Ticket #4 started with alice (1) at 02/01/26, 10:30 AM"
        );
        assert_eq!(lines[1], "[02/01/26, 10:30 AM] Topic: Bug Report");
        assert_eq!(lines[2], "[02/01/26, 10:31 AM] [STAFF] mod: What happened?");
        assert_eq!(lines[3], "[02/01/26, 10:32 AM] [USER] alice: It crashed");
    }

    #[test]
    fn filename_carries_the_ticket_number() {
        assert_eq!(filename(modmail_core::types::TicketNumber(12)), "Ticket-12.txt");
    }
}
