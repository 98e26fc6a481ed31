// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable persistence for the Modmail bot.
//!
//! The only durable state the process keeps is the last-issued ticket
//! number, held in a JSON flat file with an atomic increment-and-persist
//! contract. Ticket state itself is in-memory for the process lifetime.

pub mod counter;

pub use counter::FileCounterStore;
