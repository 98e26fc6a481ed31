// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete ticket stack -- mock gateway,
//! registry, prompt set, temp-file counter store, lifecycle controller, and
//! router -- and provides drivers that feed events through the router the
//! way the serve loop would.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use modmail_config::ModmailConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::{CounterStore, Gateway};
use modmail_core::types::{
    Attachment, ChannelId, ChannelMessage, DirectMessage, InboundEvent, MessageId, TicketAction,
    Topic, UserRef,
};
use modmail_lifecycle::LifecycleController;
use modmail_registry::{ActivePromptSet, TicketRegistry};
use modmail_router::ConversationRouter;
use modmail_storage::FileCounterStore;

use crate::mock_gateway::MockGateway;

/// Archive channel ID used by harness-built configs.
pub const ARCHIVE_CHANNEL: ChannelId = ChannelId(900);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    footer: Option<String>,
    max_attachment_bytes: Option<u64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            footer: None,
            max_attachment_bytes: None,
        }
    }

    /// Set the embed footer line.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Override the attachment forwarding threshold.
    pub fn with_max_attachment_bytes(mut self, bytes: u64) -> Self {
        self.max_attachment_bytes = Some(bytes);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ModmailError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ModmailError::Storage {
            source: e.into(),
        })?;

        let mut config = ModmailConfig::default();
        config.gateway.server_id = 1;
        config.gateway.ticket_category_id = 800;
        config.gateway.archive_channel_id = ARCHIVE_CHANNEL.0;
        config.counter.path = temp_dir
            .path()
            .join("ticket_counter.json")
            .to_string_lossy()
            .into_owned();
        config.tickets.footer = self.footer;
        if let Some(bytes) = self.max_attachment_bytes {
            config.tickets.max_attachment_bytes = bytes;
        }

        let gateway = Arc::new(MockGateway::new());
        let registry = Arc::new(TicketRegistry::new());
        let prompts = Arc::new(ActivePromptSet::new());
        let counter = Arc::new(FileCounterStore::open(&config.counter).await?);

        let lifecycle = Arc::new(LifecycleController::new(
            gateway.clone() as Arc<dyn Gateway>,
            registry.clone(),
            prompts.clone(),
            counter.clone() as Arc<dyn CounterStore>,
            &config,
        ));
        let router = Arc::new(ConversationRouter::new(
            gateway.clone() as Arc<dyn Gateway>,
            registry.clone(),
            prompts.clone(),
            lifecycle.clone(),
            &config,
        ));

        Ok(TestHarness {
            gateway,
            registry,
            prompts,
            counter,
            lifecycle,
            router,
            config,
            next_message: AtomicU64::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock gateway and temp counter file.
pub struct TestHarness {
    /// The mock gateway: captured outbound ops, scripted failures.
    pub gateway: Arc<MockGateway>,
    /// The ticket registry.
    pub registry: Arc<TicketRegistry>,
    /// The active-prompt set.
    pub prompts: Arc<ActivePromptSet>,
    /// File-backed counter store (temp file, cleaned up on drop).
    pub counter: Arc<FileCounterStore>,
    /// The lifecycle controller.
    pub lifecycle: Arc<LifecycleController>,
    /// The conversation router, the entry point for events.
    pub router: Arc<ConversationRouter>,
    /// The configuration the stack was built with.
    pub config: ModmailConfig,
    next_message: AtomicU64,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_message.fetch_add(1, Ordering::SeqCst))
    }

    /// DM channel convention: each user's DM channel shares their ID.
    pub fn dm_channel(user: &UserRef) -> ChannelId {
        ChannelId(user.id.0)
    }

    /// Drive a user DM through the router.
    pub async fn user_dm(&self, user: &UserRef, content: &str) -> Result<(), ModmailError> {
        self.user_dm_with_attachments(user, content, vec![]).await
    }

    /// Drive a user DM with attachments through the router.
    pub async fn user_dm_with_attachments(
        &self,
        user: &UserRef,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Result<(), ModmailError> {
        self.router
            .dispatch(InboundEvent::DirectMessage(DirectMessage {
                id: self.next_message_id(),
                channel: Self::dm_channel(user),
                author: user.clone(),
                content: content.into(),
                attachments,
                timestamp: Utc::now(),
            }))
            .await
    }

    /// Drive a staff channel message through the router.
    pub async fn staff_message(
        &self,
        channel: ChannelId,
        staff: &UserRef,
        content: &str,
    ) -> Result<(), ModmailError> {
        self.staff_message_with_attachments(channel, staff, content, vec![])
            .await
    }

    /// Drive a staff channel message with attachments through the router.
    pub async fn staff_message_with_attachments(
        &self,
        channel: ChannelId,
        staff: &UserRef,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Result<(), ModmailError> {
        self.router
            .dispatch(InboundEvent::ChannelMessage(ChannelMessage {
                id: self.next_message_id(),
                channel,
                author: staff.clone(),
                content: content.into(),
                attachments,
                timestamp: Utc::now(),
            }))
            .await
    }

    /// Drive a topic selection through the router.
    pub async fn select_topic(&self, user: &UserRef, topic: Topic) -> Result<(), ModmailError> {
        self.router
            .dispatch(InboundEvent::Action(TicketAction::TopicSelected {
                user: user.clone(),
                topic,
            }))
            .await
    }

    /// Drive a claim action through the router.
    pub async fn claim(&self, channel: ChannelId, staff: &UserRef) -> Result<(), ModmailError> {
        self.router
            .dispatch(InboundEvent::Action(TicketAction::Claim {
                channel,
                staff: staff.clone(),
            }))
            .await
    }

    /// Drive a close action through the router.
    pub async fn close(&self, channel: ChannelId, staff: &UserRef) -> Result<(), ModmailError> {
        self.router
            .dispatch(InboundEvent::Action(TicketAction::Close {
                channel,
                staff: staff.clone(),
            }))
            .await
    }

    /// The most recently created ticket channel.
    pub async fn latest_channel(&self) -> Option<ChannelId> {
        self.gateway.created_channels().await.last().copied()
    }

    /// Open a ticket for `user` with `topic` and return its channel.
    ///
    /// Convenience for tests that start from an already-open ticket.
    pub async fn open_ticket(
        &self,
        user: &UserRef,
        topic: Topic,
    ) -> Result<ChannelId, ModmailError> {
        self.user_dm(user, "hello").await?;
        self.select_topic(user, topic).await?;
        self.latest_channel()
            .await
            .ok_or_else(|| ModmailError::Internal("no channel was created".into()))
    }
}
