// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilient call layer for Postforge vendor traffic.
//!
//! Provides rate-limit aware retry over `reqwest`, an injectable [`Sleeper`]
//! so backoff can be observed in tests without wall-clock delay, and a
//! [`TtlCache`] for short-lived read-through memoization.

pub mod cache;
pub mod retry;
pub mod sleeper;

pub use cache::TtlCache;
pub use retry::{RetryOptions, RetryingClient, fetch_with_retry};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
