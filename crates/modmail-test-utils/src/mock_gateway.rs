// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway for deterministic testing.
//!
//! `MockGateway` implements [`Gateway`] with injectable inbound events and
//! captured outbound operations for assertion in tests. Delivery failures
//! (refused DMs, failing channel creation, failing channel sends) can be
//! scripted per test.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use modmail_core::error::ModmailError;
use modmail_core::traits::Gateway;
use modmail_core::types::{
    ChannelId, CreateChannelRequest, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    UserId, UserProfile,
};

/// One captured outbound operation, in issue order.
#[derive(Debug, Clone)]
pub enum SentOp {
    Dm {
        user: UserId,
        msg: OutboundMessage,
    },
    ChannelMessage {
        channel: ChannelId,
        msg: OutboundMessage,
    },
    ChannelCreated {
        request: CreateChannelRequest,
        assigned: ChannelId,
    },
    ChannelDeleted {
        channel: ChannelId,
    },
    Reaction {
        channel: ChannelId,
        message: MessageId,
        emoji: String,
    },
}

/// A mock messaging gateway for testing.
///
/// Inbound events injected via `inject_event()` are returned by `receive()`;
/// every outbound operation is captured and retrievable for assertions.
pub struct MockGateway {
    ops: Mutex<Vec<SentOp>>,
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    notify: Arc<Notify>,
    next_channel: AtomicU64,
    next_message: AtomicU64,
    refused_dms: Mutex<HashSet<UserId>>,
    failing_channels: Mutex<HashSet<ChannelId>>,
    fail_channel_create: AtomicBool,
    profiles: Mutex<HashMap<UserId, String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            // Assigned ticket-channel IDs start high so they never collide
            // with IDs chosen by tests.
            next_channel: AtomicU64::new(1000),
            next_message: AtomicU64::new(1),
            refused_dms: Mutex::new(HashSet::new()),
            failing_channels: Mutex::new(HashSet::new()),
            fail_channel_create: AtomicBool::new(false),
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Inject an inbound event into the receive queue.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All captured outbound operations, in issue order.
    pub async fn ops(&self) -> Vec<SentOp> {
        self.ops.lock().await.clone()
    }

    /// Clear captured operations.
    pub async fn clear_ops(&self) {
        self.ops.lock().await.clear();
    }

    /// Direct messages sent to a user, in order.
    pub async fn dms_to(&self, user: UserId) -> Vec<OutboundMessage> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                SentOp::Dm { user: u, msg } if *u == user => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages sent to a channel, in order.
    pub async fn channel_messages(&self, channel: ChannelId) -> Vec<OutboundMessage> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                SentOp::ChannelMessage { channel: c, msg } if *c == channel => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Channels created so far, in order.
    pub async fn created_channels(&self) -> Vec<ChannelId> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                SentOp::ChannelCreated { assigned, .. } => Some(*assigned),
                _ => None,
            })
            .collect()
    }

    /// Channels deleted so far, in order.
    pub async fn deleted_channels(&self) -> Vec<ChannelId> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                SentOp::ChannelDeleted { channel } => Some(*channel),
                _ => None,
            })
            .collect()
    }

    /// Reactions added so far, in order.
    pub async fn reactions(&self) -> Vec<(ChannelId, MessageId, String)> {
        self.ops
            .lock()
            .await
            .iter()
            .filter_map(|op| match op {
                SentOp::Reaction {
                    channel,
                    message,
                    emoji,
                } => Some((*channel, *message, emoji.clone())),
                _ => None,
            })
            .collect()
    }

    /// Make every DM to `user` fail with `DeliveryRefused`.
    pub async fn refuse_dms(&self, user: UserId) {
        self.refused_dms.lock().await.insert(user);
    }

    /// Make every send to `channel` fail with `Upstream`.
    pub async fn fail_sends_to(&self, channel: ChannelId) {
        self.failing_channels.lock().await.insert(channel);
    }

    /// Make channel creation fail with `Upstream`.
    pub fn fail_channel_creation(&self, fail: bool) {
        self.fail_channel_create.store(fail, Ordering::SeqCst);
    }

    /// Register a display name for `user_profile` lookups.
    pub async fn set_profile(&self, user: UserId, name: impl Into<String>) {
        self.profiles.lock().await.insert(user, name.into());
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_message.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    async fn receive(&self) -> Result<InboundEvent, ModmailError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn send_dm(
        &self,
        user: UserId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError> {
        if self.refused_dms.lock().await.contains(&user) {
            return Err(ModmailError::DeliveryRefused { user, source: None });
        }
        self.ops.lock().await.push(SentOp::Dm { user, msg });
        Ok(self.next_message_id())
    }

    async fn send_channel(
        &self,
        channel: ChannelId,
        msg: OutboundMessage,
    ) -> Result<MessageId, ModmailError> {
        if self.failing_channels.lock().await.contains(&channel) {
            return Err(ModmailError::Upstream {
                message: format!("channel {channel} is failing"),
                source: None,
            });
        }
        self.ops
            .lock()
            .await
            .push(SentOp::ChannelMessage { channel, msg });
        Ok(self.next_message_id())
    }

    async fn create_ticket_channel(
        &self,
        request: CreateChannelRequest,
    ) -> Result<ChannelId, ModmailError> {
        if self.fail_channel_create.load(Ordering::SeqCst) {
            return Err(ModmailError::Upstream {
                message: "channel creation is failing".into(),
                source: None,
            });
        }
        let assigned = ChannelId(self.next_channel.fetch_add(1, Ordering::SeqCst));
        self.ops
            .lock()
            .await
            .push(SentOp::ChannelCreated { request, assigned });
        Ok(assigned)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ModmailError> {
        self.ops.lock().await.push(SentOp::ChannelDeleted { channel });
        Ok(())
    }

    async fn react(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), ModmailError> {
        self.ops.lock().await.push(SentOp::Reaction {
            channel,
            message,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn user_profile(&self, user: UserId) -> Result<UserProfile, ModmailError> {
        let name = self
            .profiles
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_else(|| format!("user-{user}"));
        Ok(UserProfile { id: user, name })
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modmail_core::types::{DirectMessage, UserRef};

    fn make_dm(user: u64, text: &str) -> InboundEvent {
        InboundEvent::DirectMessage(DirectMessage {
            id: MessageId(1),
            channel: ChannelId(user),
            author: UserRef::new(user, format!("user-{user}")),
            content: text.into(),
            attachments: vec![],
            timestamp: chrono::Utc::now(),
        })
    }

    #[tokio::test]
    async fn receive_returns_injected_events_in_order() {
        let gateway = MockGateway::new();
        gateway.inject_event(make_dm(1, "first")).await;
        gateway.inject_event(make_dm(1, "second")).await;

        for expected in ["first", "second"] {
            match gateway.receive().await.unwrap() {
                InboundEvent::DirectMessage(dm) => assert_eq!(dm.content, expected),
                other => panic!("expected DM, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let gateway = Arc::new(MockGateway::new());
        let injector = gateway.clone();
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
            injector.inject_event(make_dm(1, "delayed")).await;
        });

        let event = tokio::time::timeout(
            tokio::time::Duration::from_secs(2),
            gateway.receive(),
        )
        .await
        .expect("receive timed out")
        .unwrap();
        assert!(matches!(event, InboundEvent::DirectMessage(_)));
    }

    #[tokio::test]
    async fn refused_dms_surface_as_delivery_refused() {
        let gateway = MockGateway::new();
        gateway.refuse_dms(UserId(5)).await;

        let err = gateway
            .send_dm(UserId(5), OutboundMessage::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModmailError::DeliveryRefused { .. }));
        assert!(gateway.dms_to(UserId(5)).await.is_empty());
    }

    #[tokio::test]
    async fn created_channels_get_distinct_ids() {
        let gateway = MockGateway::new();
        let request = CreateChannelRequest {
            name: "ticket-1".into(),
            requester: UserId(1),
            topic: modmail_core::types::Topic::Other,
        };
        let a = gateway.create_ticket_channel(request.clone()).await.unwrap();
        let b = gateway.create_ticket_channel(request).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(gateway.created_channels().await, vec![a, b]);
    }

    #[tokio::test]
    async fn profile_falls_back_to_bare_id() {
        let gateway = MockGateway::new();
        gateway.set_profile(UserId(1), "alice").await;
        assert_eq!(gateway.user_profile(UserId(1)).await.unwrap().name, "alice");
        assert_eq!(
            gateway.user_profile(UserId(2)).await.unwrap().name,
            "user-2"
        );
    }
}
