// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the injected collaborators: the messaging gateway
//! and the durable ticket-number counter.

pub mod counter;
pub mod gateway;

pub use counter::CounterStore;
pub use gateway::Gateway;
