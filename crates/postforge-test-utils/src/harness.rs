// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness backed by a temporary SQLite database.
//!
//! `TestHarness` opens a migrated database in a temp directory and exposes the
//! store and cost tracker built on it. The directory lives as long as the
//! harness.

use std::sync::Arc;

use postforge_config::PostforgeConfig;
use postforge_config::model::{CostConfig, StorageConfig};
use postforge_core::PostforgeError;
use postforge_cost::CostTracker;
use postforge_storage::{Database, SqliteStore};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    daily_budget_usd: Option<f64>,
    monthly_budget_usd: Option<f64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            daily_budget_usd: None,
            monthly_budget_usd: None,
        }
    }

    /// Set a daily budget cap for the test environment.
    pub fn with_budget(mut self, daily_usd: f64) -> Self {
        self.daily_budget_usd = Some(daily_usd);
        self
    }

    pub fn with_monthly_budget(mut self, monthly_usd: f64) -> Self {
        self.monthly_budget_usd = Some(monthly_usd);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, PostforgeError> {
        let temp_dir = tempfile::TempDir::new().map_err(PostforgeError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = PostforgeConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        config.cost = CostConfig {
            daily_budget_usd: self.daily_budget_usd,
            monthly_budget_usd: self.monthly_budget_usd,
            track_tokens: true,
        };

        let store = SqliteStore::open(&config.storage).await?;
        let db = store.database().clone();
        let cost = CostTracker::open(&config.cost, &db).await?;

        Ok(TestHarness {
            store: Arc::new(store),
            db,
            cost: Arc::new(cost),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A migrated temp database with the store and cost tracker on top.
pub struct TestHarness {
    pub store: Arc<SqliteStore>,
    pub db: Database,
    pub cost: Arc<CostTracker>,
    pub config: PostforgeConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default config and no budget caps.
    ///
    /// # Panics
    /// If the temp database cannot be created.
    pub async fn new() -> Self {
        Self::builder()
            .build()
            .await
            .expect("test harness should build")
    }

    pub fn database_path(&self) -> &str {
        &self.config.storage.database_path
    }
}
