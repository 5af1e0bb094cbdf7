// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Answerdesk integration tests.
//!
//! Provides mock adapters and a test harness for deterministic,
//! CI-runnable testing without external API calls.

pub mod harness;
pub mod memory_storage;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_storage::MemoryStorage;
pub use mock_provider::{MockOutcome, MockProvider};
