// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation routing for the Modmail bot.
//!
//! Classifies every inbound event exactly once and dispatches it: user DMs
//! are forwarded into their ticket channel (or start a topic prompt), staff
//! channel messages are forwarded to the user once the ticket is claimed,
//! and UI actions drive the lifecycle controller.

pub mod attachments;
pub mod router;

pub use router::{ACK_EMOJI, ConversationRouter};
