// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Postforge integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with pre-configured responses
//! - [`MockBatchVendor`] - Scripted batch vendor
//! - [`RecordingCostCollaborator`] - Budget gate and usage log double
//! - [`FailingStore`] - Store that fails every call
//! - [`TestHarness`] - Temp SQLite database with store and cost tracker

pub mod failing_store;
pub mod harness;
pub mod mock_batch;
pub mod mock_cost;
pub mod mock_provider;

pub use failing_store::FailingStore;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_batch::{MockBatchVendor, failed, succeeded};
pub use mock_cost::RecordingCostCollaborator;
pub use mock_provider::{MOCK_USAGE, MockProvider};
