// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Modmail ticket bot.
//!
//! This crate provides the trait definitions, error types, and common types
//! used throughout the Modmail workspace. The gateway adapter and the
//! counter store implement traits defined here; the registry, router, and
//! lifecycle crates build on the shared types.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ModmailError;
pub use traits::{CounterStore, Gateway};
pub use types::{
    Accent, Attachment, ChannelId, ChannelMessage, ComponentSet, CreateChannelRequest,
    DirectMessage, Embed, FilePayload, HealthStatus, InboundEvent, LogEntry, LogRole, MessageId,
    OutboundMessage, TicketAction, TicketNumber, Topic, UserId, UserProfile, UserRef,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _dup = ModmailError::DuplicateTicket { user: UserId(1) };
        let _unknown = ModmailError::UnknownChannel {
            channel: ChannelId(2),
        };
        let _claimed = ModmailError::AlreadyClaimed {
            channel: ChannelId(2),
            holder: UserId(3),
            holder_name: "mod".into(),
        };
        let _not_claimed = ModmailError::NotClaimed {
            channel: ChannelId(2),
        };
        let _refused = ModmailError::DeliveryRefused {
            user: UserId(1),
            source: None,
        };
        let _upstream = ModmailError::Upstream {
            message: "send failed".into(),
            source: Some(Box::new(std::io::Error::other("down"))),
        };
        let _config = ModmailError::Config("bad key".into());
        let _storage = ModmailError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        let _internal = ModmailError::Internal("bug".into());
    }

    #[test]
    fn traits_are_object_safe() {
        fn _gateway(_: &dyn Gateway) {}
        fn _counter(_: &dyn CounterStore) {}
    }
}
