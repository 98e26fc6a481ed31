// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway trait for the chat-platform connection.

use async_trait::async_trait;

use crate::error::ModmailError;
use crate::types::{
    ChannelId, CreateChannelRequest, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    UserId, UserProfile,
};

/// The chat-platform connection: event delivery plus the outbound operations
/// the ticket system needs.
///
/// All state mutation lives outside this trait; an implementation only
/// translates between the platform SDK and the core event/payload types.
/// Sending to a user who has disabled direct messages must surface as
/// [`ModmailError::DeliveryRefused`] so callers can decide per-call whether
/// the failure is fatal.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Human-readable adapter name, for logs.
    fn name(&self) -> &str;

    /// Receives the next inbound event from the platform.
    async fn receive(&self) -> Result<InboundEvent, ModmailError>;

    /// Delivers a message to a user's direct-message destination.
    async fn send_dm(
        &self,
        user: UserId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError>;

    /// Delivers a message to a guild channel.
    async fn send_channel(
        &self,
        channel: ChannelId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError>;

    /// Creates a private ticket channel under the configured category with
    /// per-identity access overwrites.
    async fn create_ticket_channel(
        &self,
        request: CreateChannelRequest,
    ) -> Result<ChannelId, ModmailError>;

    /// Deletes a ticket channel.
    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ModmailError>;

    /// Adds an acknowledgement reaction to a message.
    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ModmailError>;

    /// Resolves a user's profile for transcript headers.
    async fn user_profile(&self, user: UserId) -> Result<UserProfile, ModmailError>;

    /// Checks connectivity to the platform.
    async fn health_check(&self) -> Result<HealthStatus, ModmailError>;

    /// Gracefully shuts down the connection.
    async fn shutdown(&self) -> Result<(), ModmailError>;
}
