// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Modmail integration tests.
//!
//! Provides [`MockGateway`] for capturing outbound gateway operations and
//! injecting inbound events, and [`TestHarness`] for assembling the full
//! ticket stack against a temp counter file.

pub mod harness;
pub mod mock_gateway;

pub use harness::{ARCHIVE_CHANNEL, TestHarness, TestHarnessBuilder};
pub use mock_gateway::{MockGateway, SentOp};
