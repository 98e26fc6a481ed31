// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authoritative in-memory mapping of open tickets, claims, and
//! conversation logs.
//!
//! All ticket state lives behind a single mutex and is mutated only through
//! the methods here; callers never touch raw maps. Every method is
//! synchronous, so no critical section can span an await point -- gateway
//! I/O always happens outside the lock.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use modmail_core::error::ModmailError;
use modmail_core::types::{ChannelId, LogEntry, TicketNumber, Topic, UserId, UserRef};

/// One open support conversation, backed by a dedicated private channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub channel: ChannelId,
    pub user: UserId,
    pub number: TicketNumber,
    pub topic: Topic,
    pub created_at: DateTime<Utc>,
}

/// The staff identity holding exclusive responder rights over a ticket.
///
/// At most one per channel; created on first successful claim and immutable
/// until the ticket closes. No re-claim, no transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub staff: UserId,
    pub staff_name: String,
    pub claimed_at: DateTime<Utc>,
}

/// Everything removed from the registry when a ticket closes, handed to the
/// transcript generator.
#[derive(Debug, Clone)]
pub struct ClosedTicket {
    pub ticket: Ticket,
    pub claim: Option<ClaimRecord>,
    pub log: Vec<LogEntry>,
}

#[derive(Default)]
struct RegistryInner {
    tickets: HashMap<ChannelId, Ticket>,
    by_user: HashMap<UserId, ChannelId>,
    claims: HashMap<ChannelId, ClaimRecord>,
    logs: HashMap<ChannelId, Vec<LogEntry>>,
}

/// Synchronized registry of open tickets.
///
/// Invariants enforced here:
/// - at most one open ticket per user;
/// - a channel is registered iff it has an open ticket;
/// - at most one claim per channel, immutable until close;
/// - log entries append in the order their events enter the critical section.
#[derive(Default)]
pub struct TicketRegistry {
    inner: Mutex<RegistryInner>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        // A poisoned lock only means another handler panicked mid-section;
        // the maps themselves are always in a consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a ticket for `user` in `channel`, seeding its conversation log
    /// with the selected topic.
    ///
    /// Fails with [`ModmailError::DuplicateTicket`] if the user already has
    /// an open ticket; the duplicate check and the insert are one critical
    /// section.
    pub fn open_ticket(
        &self,
        user: UserId,
        channel: ChannelId,
        number: TicketNumber,
        topic: Topic,
        opened_at: DateTime<Utc>,
    ) -> Result<Ticket, ModmailError> {
        let mut inner = self.lock();

        if inner.by_user.contains_key(&user) {
            return Err(ModmailError::DuplicateTicket { user });
        }

        let ticket = Ticket {
            channel,
            user,
            number,
            topic,
            created_at: opened_at,
        };

        inner.by_user.insert(user, channel);
        inner.tickets.insert(channel, ticket.clone());
        inner.logs.insert(
            channel,
            vec![LogEntry::Topic {
                timestamp: opened_at,
                topic,
            }],
        );

        tracing::debug!(
            user = %user,
            channel = %channel,
            number = %number,
            "ticket registered"
        );
        Ok(ticket)
    }

    /// Looks up the open ticket for a user, if any.
    pub fn find_by_user(&self, user: UserId) -> Option<Ticket> {
        let inner = self.lock();
        let channel = inner.by_user.get(&user)?;
        inner.tickets.get(channel).cloned()
    }

    /// Looks up the open ticket routed through a channel, if any.
    pub fn find_by_channel(&self, channel: ChannelId) -> Option<Ticket> {
        self.lock().tickets.get(&channel).cloned()
    }

    /// Records `staff` as the exclusive claimant of the ticket in `channel`.
    ///
    /// Fails with [`ModmailError::UnknownChannel`] if no open ticket maps to
    /// the channel, and with [`ModmailError::AlreadyClaimed`] (naming the
    /// holder) if a claim record exists. Failures never mutate state, so a
    /// repeated losing claim keeps reporting the same holder.
    pub fn claim(
        &self,
        channel: ChannelId,
        staff: &UserRef,
        claimed_at: DateTime<Utc>,
    ) -> Result<ClaimRecord, ModmailError> {
        let mut inner = self.lock();

        if !inner.tickets.contains_key(&channel) {
            return Err(ModmailError::UnknownChannel { channel });
        }
        if let Some(existing) = inner.claims.get(&channel) {
            return Err(ModmailError::AlreadyClaimed {
                channel,
                holder: existing.staff,
                holder_name: existing.staff_name.clone(),
            });
        }

        let record = ClaimRecord {
            staff: staff.id,
            staff_name: staff.name.clone(),
            claimed_at,
        };
        inner.claims.insert(channel, record.clone());

        tracing::debug!(channel = %channel, staff = %staff.id, "ticket claimed");
        Ok(record)
    }

    /// Returns the claim record for a channel, if the ticket has been claimed.
    pub fn claim_of(&self, channel: ChannelId) -> Option<ClaimRecord> {
        self.lock().claims.get(&channel).cloned()
    }

    /// Appends a log entry to the ticket routed through `channel`.
    ///
    /// Entries append in the order calls win the lock, which is the order
    /// their events were accepted.
    pub fn append_log(&self, channel: ChannelId, entry: LogEntry) -> Result<(), ModmailError> {
        let mut inner = self.lock();
        match inner.logs.get_mut(&channel) {
            Some(log) => {
                log.push(entry);
                Ok(())
            }
            None => Err(ModmailError::UnknownChannel { channel }),
        }
    }

    /// Atomically removes every trace of the ticket in `channel`, returning
    /// the ticket, its claim (if any), and the final conversation log.
    pub fn close_ticket(&self, channel: ChannelId) -> Result<ClosedTicket, ModmailError> {
        let mut inner = self.lock();

        let ticket = inner
            .tickets
            .remove(&channel)
            .ok_or(ModmailError::UnknownChannel { channel })?;
        inner.by_user.remove(&ticket.user);
        let claim = inner.claims.remove(&channel);
        let log = inner.logs.remove(&channel).unwrap_or_default();

        tracing::debug!(
            channel = %channel,
            number = %ticket.number,
            entries = log.len(),
            "ticket closed and deregistered"
        );
        Ok(ClosedTicket { ticket, claim, log })
    }

    /// Number of currently open tickets.
    pub fn open_count(&self) -> usize {
        self.lock().tickets.len()
    }
}
