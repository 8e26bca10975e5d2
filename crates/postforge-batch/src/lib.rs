// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch job state machine for Postforge.
//!
//! Jobs are persisted as `processing` once the vendor accepts them and move
//! to `completed` or `failed` only through [`BatchProcessor::poll_batch_results`].

pub mod convert;
pub mod processor;
pub mod scheduler;

pub use convert::{Materialized, materialize};
pub use processor::{BatchProcessor, PollReport, SubmitOutcome};
pub use scheduler::run_poll_loop;
