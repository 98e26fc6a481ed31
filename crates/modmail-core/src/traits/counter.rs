// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counter store trait for durable ticket-number allocation.

use async_trait::async_trait;

use crate::error::ModmailError;
use crate::types::TicketNumber;

/// Durable monotonic ticket-number generator.
///
/// `next()` must be atomic with respect to concurrent callers: every call
/// returns a number strictly greater than any previously issued, and the new
/// value is persisted before the call returns.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Allocates and persists the next ticket number.
    async fn next(&self) -> Result<TicketNumber, ModmailError>;

    /// Returns the last issued number (zero if none has been issued).
    async fn last_issued(&self) -> Result<u64, ModmailError>;
}
