// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Modmail workspace.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Opaque identifier for a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Opaque identifier for a routing destination (a channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Opaque identifier for a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Monotonically increasing ticket number issued by the counter store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketNumber(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user reference as it arrives on an inbound event: identity plus the
/// display name used in logs and forwarded messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }
}

/// Closed set of ticket topics offered in the selection prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Topic {
    #[strum(serialize = "In-Game Report")]
    #[serde(rename = "In-Game Report")]
    InGameReport,
    #[strum(serialize = "Bug Report")]
    #[serde(rename = "Bug Report")]
    BugReport,
    #[strum(serialize = "Other")]
    #[serde(rename = "Other")]
    Other,
}

impl Topic {
    /// Short description shown next to the topic in the selection menu.
    pub fn description(&self) -> &'static str {
        match self {
            Topic::InGameReport => "Report an issue with the game.",
            Topic::BugReport => "Report a bug or glitch.",
            Topic::Other => "Other",
        }
    }
}

/// Who authored a forwarded conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRole {
    User,
    Staff,
}

impl fmt::Display for LogRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRole::User => write!(f, "USER"),
            LogRole::Staff => write!(f, "STAFF"),
        }
    }
}

/// One entry in a ticket's append-only conversation log.
///
/// The first entry of every log is the `Topic` seed recorded at creation;
/// every forwarded message in either direction appends a `Message` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Topic {
        timestamp: DateTime<Utc>,
        topic: Topic,
    },
    Message {
        timestamp: DateTime<Utc>,
        role: LogRole,
        author: String,
        content: String,
    },
}

impl LogEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogEntry::Topic { timestamp, .. } | LogEntry::Message { timestamp, .. } => *timestamp,
        }
    }
}

/// Timestamp format used in transcripts and log lines, e.g. `01/31/26, 09:15 PM`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%m/%d/%y, %I:%M %p").to_string()
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Topic { timestamp, topic } => {
                write!(f, "[{}] Topic: {topic}", format_timestamp(*timestamp))
            }
            LogEntry::Message {
                timestamp,
                role,
                author,
                content,
            } => write!(
                f,
                "[{}] [{role}] {author}: {content}",
                format_timestamp(*timestamp)
            ),
        }
    }
}

/// An attachment carried on an inbound message.
///
/// The payload stays on the platform's CDN; forwarding re-uploads by URL, so
/// only metadata travels through the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub size_bytes: u64,
    pub url: String,
}

/// A direct message from an end user to the bot.
#[derive(Debug, Clone)]
pub struct DirectMessage {
    pub id: MessageId,
    /// The DM channel the message arrived on (acknowledgement target).
    pub channel: ChannelId,
    pub author: UserRef,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

/// A message posted by staff inside a guild channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub author: UserRef,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

/// Closed set of lifecycle actions triggered by UI interactions.
#[derive(Debug, Clone)]
pub enum TicketAction {
    /// The user completed the topic-selection prompt.
    TopicSelected { user: UserRef, topic: Topic },
    /// A staff member pressed the claim button in a ticket channel.
    Claim { channel: ChannelId, staff: UserRef },
    /// A staff member pressed the close button in a ticket channel.
    Close { channel: ChannelId, staff: UserRef },
}

/// Every event the gateway can deliver to the router.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    DirectMessage(DirectMessage),
    ChannelMessage(ChannelMessage),
    Action(TicketAction),
}

/// Accent color for a notice embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    /// Informational (prompt, general notices).
    Info,
    /// Success (ticket created, transcript for the user).
    Success,
    /// Warning (action panel, attention needed).
    Warning,
    /// Failure or closure.
    Danger,
    /// Archived transcript.
    Archive,
}

/// A titled notice rendered as an embed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub body: String,
    pub accent: Accent,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, body: impl Into<String>, accent: Accent) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            accent,
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer;
        self
    }
}

/// Interactive component sets the gateway knows how to render.
///
/// The actions these trigger come back as [`TicketAction`] events; rendering
/// details stay inside the gateway adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSet {
    /// Topic-selection dropdown sent with the first-contact prompt.
    TopicMenu,
    /// Claim/close buttons posted in a new ticket channel.
    TicketActions,
}

/// An in-memory file payload attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// An outbound message: plain text, an optional embed, optional interactive
/// components, generated file payloads, and inbound attachments to re-upload.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    pub text: Option<String>,
    pub embed: Option<Embed>,
    pub components: Option<ComponentSet>,
    pub files: Vec<FilePayload>,
    pub forward_attachments: Vec<Attachment>,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: ComponentSet) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_file(mut self, file: FilePayload) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_forwarded(mut self, attachments: Vec<Attachment>) -> Self {
        self.forward_attachments = attachments;
        self
    }
}

/// Request to create a private ticket channel.
///
/// The gateway grants the requester read-only access, the bot full access,
/// and hides the channel from everyone else.
#[derive(Debug, Clone)]
pub struct CreateChannelRequest {
    pub name: String,
    pub requester: UserId,
    pub topic: Topic,
}

/// Resolved profile of a platform user, for transcript headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
}

/// Health reported by the gateway health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn topic_labels_round_trip() {
        for topic in [Topic::InGameReport, Topic::BugReport, Topic::Other] {
            let label = topic.to_string();
            let parsed = Topic::from_str(&label).expect("label should parse back");
            assert_eq!(topic, parsed);
        }
        assert_eq!(Topic::InGameReport.to_string(), "In-Game Report");
        assert_eq!(Topic::BugReport.to_string(), "Bug Report");
    }

    #[test]
    fn log_entry_display_matches_transcript_format() {
        let ts = chrono::DateTime::parse_from_rfc3339("2026-01-31T21:15:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let seed = LogEntry::Topic {
            timestamp: ts,
            topic: Topic::BugReport,
        };
        assert_eq!(seed.to_string(), "[01/31/26, 09:15 PM] Topic: Bug Report");

        let msg = LogEntry::Message {
            timestamp: ts,
            role: LogRole::Staff,
            author: "mod".into(),
            content: "What happened?".into(),
        };
        assert_eq!(
            msg.to_string(),
            "[01/31/26, 09:15 PM] [STAFF] mod: What happened?"
        );
    }

    #[test]
    fn log_role_display() {
        assert_eq!(LogRole::User.to_string(), "USER");
        assert_eq!(LogRole::Staff.to_string(), "STAFF");
    }

    #[test]
    fn outbound_message_builders() {
        let msg = OutboundMessage::text("hello")
            .with_components(ComponentSet::TopicMenu)
            .with_file(FilePayload {
                filename: "t.txt".into(),
                data: b"x".to_vec(),
            });
        assert_eq!(msg.text.as_deref(), Some("hello"));
        assert_eq!(msg.components, Some(ComponentSet::TopicMenu));
        assert_eq!(msg.files.len(), 1);
        assert!(msg.embed.is_none());
    }

    #[test]
    fn ids_display_as_raw_numbers() {
        assert_eq!(UserId(42).to_string(), "42");
        assert_eq!(ChannelId(7).to_string(), "7");
        assert_eq!(TicketNumber(1).to_string(), "1");
    }
}
