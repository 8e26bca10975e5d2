// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow store contracts consumed by the core subsystems.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PostforgeError;
use crate::types::{BatchDraft, BatchJob, GenerationHistoryEntry, PatternUsage};

/// Per-account generation history used by pattern rotation.
#[async_trait]
pub trait GenerationHistoryStore: Send + Sync {
    /// Returns at most `limit` entries for the account, newest first.
    async fn recent_history(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<GenerationHistoryEntry>, PostforgeError>;

    /// Appends one usage row. Rows are never updated.
    async fn append_usage(
        &self,
        account_id: &str,
        usage: &PatternUsage,
    ) -> Result<(), PostforgeError>;
}

/// Persistence for batch jobs.
///
/// The batch state machine is the sole writer of `status`, `completed_count`
/// and `results`. Transition methods return `false` when the job was no longer
/// in `processing`, so a terminal state is never overwritten.
#[async_trait]
pub trait BatchJobStore: Send + Sync {
    /// Persists a freshly submitted job.
    async fn insert_job(&self, job: &BatchJob) -> Result<(), PostforgeError>;

    /// All jobs currently in `processing`, oldest first.
    async fn processing_jobs(&self) -> Result<Vec<BatchJob>, PostforgeError>;

    /// Takes a time-bounded lease on a processing job. Returns `false` if
    /// another poller holds an unexpired lease or the job is not processing.
    async fn try_lease_job(
        &self,
        batch_id: &str,
        owner: &str,
        lease: Duration,
    ) -> Result<bool, PostforgeError>;

    /// Releases a lease held by `owner` without changing status.
    async fn release_lease(&self, batch_id: &str, owner: &str) -> Result<(), PostforgeError>;

    /// Moves a processing job to `completed`, persisting drafts and the
    /// completed count in the same transaction.
    async fn complete_job(
        &self,
        batch_id: &str,
        results: &[BatchDraft],
    ) -> Result<bool, PostforgeError>;

    /// Moves a processing job to `failed`.
    async fn fail_job(&self, batch_id: &str, reason: &str) -> Result<bool, PostforgeError>;

    /// Fetches one job.
    async fn get_job(&self, batch_id: &str) -> Result<Option<BatchJob>, PostforgeError>;

    /// Lists jobs newest first.
    async fn list_jobs(&self, limit: usize) -> Result<Vec<BatchJob>, PostforgeError>;
}
