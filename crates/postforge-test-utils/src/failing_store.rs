// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A store whose every operation fails, for degradation tests.

use std::time::Duration;

use async_trait::async_trait;

use postforge_core::{
    BatchDraft, BatchJob, BatchJobStore, GenerationHistoryEntry, GenerationHistoryStore,
    PatternUsage, PostforgeError,
};

/// Fails every call with a storage error carrying `message`.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn error(&self) -> PostforgeError {
        PostforgeError::storage(std::io::Error::other(self.message.clone()))
    }
}

#[async_trait]
impl GenerationHistoryStore for FailingStore {
    async fn recent_history(
        &self,
        _account_id: &str,
        _limit: usize,
    ) -> Result<Vec<GenerationHistoryEntry>, PostforgeError> {
        Err(self.error())
    }

    async fn append_usage(
        &self,
        _account_id: &str,
        _usage: &PatternUsage,
    ) -> Result<(), PostforgeError> {
        Err(self.error())
    }
}

#[async_trait]
impl BatchJobStore for FailingStore {
    async fn insert_job(&self, _job: &BatchJob) -> Result<(), PostforgeError> {
        Err(self.error())
    }

    async fn processing_jobs(&self) -> Result<Vec<BatchJob>, PostforgeError> {
        Err(self.error())
    }

    async fn try_lease_job(
        &self,
        _batch_id: &str,
        _owner: &str,
        _lease: Duration,
    ) -> Result<bool, PostforgeError> {
        Err(self.error())
    }

    async fn release_lease(&self, _batch_id: &str, _owner: &str) -> Result<(), PostforgeError> {
        Err(self.error())
    }

    async fn complete_job(
        &self,
        _batch_id: &str,
        _results: &[BatchDraft],
    ) -> Result<bool, PostforgeError> {
        Err(self.error())
    }

    async fn fail_job(&self, _batch_id: &str, _reason: &str) -> Result<bool, PostforgeError> {
        Err(self.error())
    }

    async fn get_job(&self, _batch_id: &str) -> Result<Option<BatchJob>, PostforgeError> {
        Err(self.error())
    }

    async fn list_jobs(&self, _limit: usize) -> Result<Vec<BatchJob>, PostforgeError> {
        Err(self.error())
    }
}
