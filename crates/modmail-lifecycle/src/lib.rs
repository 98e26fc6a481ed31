// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket lifecycle orchestration for the Modmail bot.
//!
//! The [`LifecycleController`] drives the create/claim/close state machine
//! triggered by UI actions; [`transcript`] serializes finished conversation
//! logs; [`notices`] holds every user- and staff-facing embed.

pub mod controller;
pub mod notices;
pub mod transcript;

pub use controller::{LifecycleController, TicketState};
