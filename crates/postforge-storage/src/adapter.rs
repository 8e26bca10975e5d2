// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the history and batch job store traits.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use postforge_config::model::StorageConfig;
use postforge_core::{
    AdapterType, BatchDraft, BatchJob, BatchJobStore, GenerationHistoryEntry,
    GenerationHistoryStore, HealthStatus, PatternUsage, PluginAdapter, PostforgeError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wraps an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, PostforgeError> {
        let db = Database::open_with_options(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self::new(db))
    }

    /// The underlying database, for collaborators that share the connection.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Drafts materialized for one batch.
    pub async fn list_drafts(&self, batch_id: &str) -> Result<Vec<BatchDraft>, PostforgeError> {
        queries::batch_jobs::list_drafts(&self.db, batch_id).await
    }

    /// Checkpoints the WAL before the process exits.
    pub async fn close(&self) -> Result<(), PostforgeError> {
        self.db.checkpoint().await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PostforgeError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationHistoryStore for SqliteStore {
    async fn recent_history(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<GenerationHistoryEntry>, PostforgeError> {
        queries::history::recent_history(&self.db, account_id, limit).await
    }

    async fn append_usage(
        &self,
        account_id: &str,
        usage: &PatternUsage,
    ) -> Result<(), PostforgeError> {
        queries::history::append_usage(&self.db, account_id, usage).await
    }
}

#[async_trait]
impl BatchJobStore for SqliteStore {
    async fn insert_job(&self, job: &BatchJob) -> Result<(), PostforgeError> {
        queries::batch_jobs::insert_job(&self.db, job).await
    }

    async fn processing_jobs(&self) -> Result<Vec<BatchJob>, PostforgeError> {
        queries::batch_jobs::processing_jobs(&self.db).await
    }

    async fn try_lease_job(
        &self,
        batch_id: &str,
        owner: &str,
        lease: Duration,
    ) -> Result<bool, PostforgeError> {
        queries::batch_jobs::try_lease_job(&self.db, batch_id, owner, lease).await
    }

    async fn release_lease(&self, batch_id: &str, owner: &str) -> Result<(), PostforgeError> {
        queries::batch_jobs::release_lease(&self.db, batch_id, owner).await
    }

    async fn complete_job(
        &self,
        batch_id: &str,
        results: &[BatchDraft],
    ) -> Result<bool, PostforgeError> {
        queries::batch_jobs::complete_job(&self.db, batch_id, results).await
    }

    async fn fail_job(&self, batch_id: &str, reason: &str) -> Result<bool, PostforgeError> {
        queries::batch_jobs::fail_job(&self.db, batch_id, reason).await
    }

    async fn get_job(&self, batch_id: &str) -> Result<Option<BatchJob>, PostforgeError> {
        queries::batch_jobs::get_job(&self.db, batch_id).await
    }

    async fn list_jobs(&self, limit: usize) -> Result<Vec<BatchJob>, PostforgeError> {
        queries::batch_jobs::list_jobs(&self.db, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postforge_core::{BatchStatus, TaskType};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn store_reports_identity_and_health() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = SqliteStore::open(&make_config(path.to_str().unwrap()))
            .await
            .unwrap();

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Storage);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let config = make_config(path.to_str().unwrap());

        {
            let store = SqliteStore::open(&config).await.unwrap();
            store
                .append_usage(
                    "acct",
                    &PatternUsage {
                        opening: Some("O-B".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            store
                .insert_job(&BatchJob {
                    batch_id: "msgbatch_1".to_string(),
                    provider: "anthropic".to_string(),
                    status: BatchStatus::Processing,
                    task_type: TaskType::TweetGeneration,
                    request_count: 1,
                    completed_count: 0,
                    items: Vec::new(),
                    results: Vec::new(),
                    error: None,
                    created_at: "2026-01-01T00:00:00.000Z".to_string(),
                    completed_at: None,
                })
                .await
                .unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteStore::open(&config).await.unwrap();
        let history = store.recent_history("acct", 5).await.unwrap();
        assert_eq!(history[0].opening, Some("O-B".into()));
        assert_eq!(store.processing_jobs().await.unwrap().len(), 1);
    }
}
