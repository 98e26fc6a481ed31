// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory ticket state for the Modmail bot.
//!
//! Owns all mutable ticket-related state: the registry of open tickets with
//! their claims and conversation logs, and the set of users with an
//! outstanding topic prompt. No I/O happens in this crate; every mutation is
//! a short synchronous critical section.

pub mod prompts;
pub mod registry;

pub use prompts::ActivePromptSet;
pub use registry::{ClaimRecord, ClosedTicket, Ticket, TicketRegistry};
