// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Modmail ticket bot.

use thiserror::Error;

use crate::types::{ChannelId, UserId};

/// The primary error type used across registry, routing, and lifecycle
/// operations.
///
/// Registry invariant violations (`DuplicateTicket`, `UnknownChannel`,
/// `AlreadyClaimed`, `NotClaimed`) are synchronous rejections that never
/// mutate state. `DeliveryRefused` is swallowed by callers for whom a single
/// unreachable recipient must not abort a multi-recipient operation.
#[derive(Debug, Error)]
pub enum ModmailError {
    /// The user already has an open ticket.
    #[error("user {user} already has an open ticket")]
    DuplicateTicket { user: UserId },

    /// The operation targets a channel with no registry entry.
    #[error("channel {channel} has no open ticket")]
    UnknownChannel { channel: ChannelId },

    /// A claim race was lost; the record names who holds the ticket.
    #[error("ticket in channel {channel} is already claimed by {holder_name}")]
    AlreadyClaimed {
        channel: ChannelId,
        holder: UserId,
        holder_name: String,
    },

    /// A staff reply arrived before the ticket was claimed.
    #[error("ticket in channel {channel} has not been claimed yet")]
    NotClaimed { channel: ChannelId },

    /// The recipient is unreachable by direct message (blocked DMs).
    #[error("direct message to user {user} was refused")]
    DeliveryRefused {
        user: UserId,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A gateway operation (send, channel management, upload) failed.
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Counter-store persistence errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModmailError {
    /// True for the registry rejections that are reported to the actor and
    /// never retried.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ModmailError::DuplicateTicket { .. }
                | ModmailError::UnknownChannel { .. }
                | ModmailError::AlreadyClaimed { .. }
                | ModmailError::NotClaimed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_classification() {
        assert!(ModmailError::DuplicateTicket { user: UserId(1) }.is_rejection());
        assert!(
            ModmailError::NotClaimed {
                channel: ChannelId(2)
            }
            .is_rejection()
        );
        assert!(
            !ModmailError::DeliveryRefused {
                user: UserId(1),
                source: None,
            }
            .is_rejection()
        );
        assert!(!ModmailError::Config("bad".into()).is_rejection());
    }

    #[test]
    fn already_claimed_names_the_holder() {
        let err = ModmailError::AlreadyClaimed {
            channel: ChannelId(9),
            holder: UserId(3),
            holder_name: "mod".into(),
        };
        assert!(err.to_string().contains("mod"));
    }
}
