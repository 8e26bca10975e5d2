// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger persisting one row per vendor call to `usage_logs`.
//!
//! Supports daily, monthly, and per-batch totals for budget enforcement and
//! reporting.

use postforge_core::{PostforgeError, TaskType, UsageEvent};
use postforge_storage::{Database, map_tr_err};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single usage row representing one vendor call or one batch record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    pub provider: String,
    pub model: String,
    pub task_type: TaskType,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Calculated cost in USD, after any batch discount.
    pub cost_usd: f64,
    pub is_batch: bool,
    pub batch_id: Option<String>,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

impl UsageRecord {
    /// Builds a record for `event` stamped with the current time.
    pub fn from_event(event: &UsageEvent, cost_usd: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider: event.provider.clone(),
            model: event.model.clone(),
            task_type: event.task_type,
            input_tokens: event.input_tokens,
            output_tokens: event.output_tokens,
            cost_usd,
            is_batch: event.is_batch,
            batch_id: event.batch_id.clone(),
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        }
    }
}

/// Persistent usage ledger backed by SQLite.
///
/// Shares the store's single-writer connection.
#[derive(Clone)]
pub struct UsageLedger {
    conn: tokio_rusqlite::Connection,
}

impl UsageLedger {
    pub fn new(conn: tokio_rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Uses the connection of an open, migrated [`Database`].
    pub fn from_database(db: &Database) -> Self {
        Self::new(db.connection().clone())
    }

    /// Inserts one record.
    pub async fn record(&self, record: &UsageRecord) -> Result<(), PostforgeError> {
        let row = record.clone();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO usage_logs (id, provider, model, task_type, input_tokens, \
                     output_tokens, cost_usd, is_batch, batch_id, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        row.id,
                        row.provider,
                        row.model,
                        row.task_type.to_string(),
                        row.input_tokens,
                        row.output_tokens,
                        row.cost_usd,
                        row.is_batch,
                        row.batch_id,
                        row.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        info!(
            provider = %record.provider,
            model = %record.model,
            task_type = %record.task_type,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cost_usd = record.cost_usd,
            is_batch = record.is_batch,
            "usage recorded"
        );
        Ok(())
    }

    async fn sum(&self, filter: &'static str, arg: String) -> Result<f64, PostforgeError> {
        self.conn
            .call(move |conn| -> Result<f64, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT COALESCE(SUM(cost_usd), 0.0) FROM usage_logs WHERE {filter}"),
                    rusqlite::params![arg],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)
    }

    /// Sum of costs for a date such as `2026-03-01`.
    pub async fn daily_total(&self, date: &str) -> Result<f64, PostforgeError> {
        self.sum(
            "created_at >= ?1 AND created_at < date(?1, '+1 day')",
            date.to_string(),
        )
        .await
    }

    /// Sum of costs for a year-month such as `2026-03`.
    pub async fn monthly_total(&self, year_month: &str) -> Result<f64, PostforgeError> {
        self.sum("created_at LIKE ?1", format!("{year_month}%")).await
    }

    /// Sum of costs attributed to one batch.
    pub async fn batch_total(&self, batch_id: &str) -> Result<f64, PostforgeError> {
        self.sum("batch_id = ?1", batch_id.to_string()).await
    }

    /// Number of usage rows attributed to one batch.
    pub async fn batch_record_count(&self, batch_id: &str) -> Result<u64, PostforgeError> {
        let batch_id = batch_id.to_string();
        let count = self
            .conn
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM usage_logs WHERE batch_id = ?1",
                    rusqlite::params![batch_id],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cost_usd: f64, created_at: &str, batch_id: Option<&str>) -> UsageRecord {
        UsageRecord {
            id: uuid::Uuid::new_v4().to_string(),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            task_type: TaskType::TweetGeneration,
            input_tokens: 1000,
            output_tokens: 500,
            cost_usd,
            is_batch: batch_id.is_some(),
            batch_id: batch_id.map(str::to_string),
            created_at: created_at.to_string(),
        }
    }

    async fn ledger() -> UsageLedger {
        UsageLedger::from_database(&Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn daily_total_sums_only_that_day() {
        let ledger = ledger().await;
        ledger
            .record(&record(1.50, "2026-03-01T10:00:00.000Z", None))
            .await
            .unwrap();
        ledger
            .record(&record(0.75, "2026-03-01T23:59:59.000Z", None))
            .await
            .unwrap();
        ledger
            .record(&record(9.0, "2026-03-02T00:00:00.000Z", None))
            .await
            .unwrap();

        let total = ledger.daily_total("2026-03-01").await.unwrap();
        assert!((total - 2.25).abs() < 1e-10, "got {total}");
    }

    #[tokio::test]
    async fn monthly_total_sums_month() {
        let ledger = ledger().await;
        ledger
            .record(&record(2.0, "2026-03-01T10:00:00.000Z", None))
            .await
            .unwrap();
        ledger
            .record(&record(3.0, "2026-03-15T10:00:00.000Z", None))
            .await
            .unwrap();
        ledger
            .record(&record(4.0, "2026-04-01T10:00:00.000Z", None))
            .await
            .unwrap();

        let total = ledger.monthly_total("2026-03").await.unwrap();
        assert!((total - 5.0).abs() < 1e-10, "got {total}");
    }

    #[tokio::test]
    async fn batch_totals_are_attributed() {
        let ledger = ledger().await;
        let ts = "2026-03-01T10:00:00.000Z";
        ledger.record(&record(0.5, ts, Some("b1"))).await.unwrap();
        ledger.record(&record(0.25, ts, Some("b1"))).await.unwrap();
        ledger.record(&record(1.0, ts, None)).await.unwrap();

        assert_eq!(ledger.batch_record_count("b1").await.unwrap(), 2);
        let total = ledger.batch_total("b1").await.unwrap();
        assert!((total - 0.75).abs() < 1e-10);
        assert_eq!(ledger.batch_total("none").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn from_event_copies_batch_fields() {
        let event = UsageEvent::batch(
            "anthropic",
            "claude-sonnet-4-20250514",
            TaskType::ReplyGeneration,
            postforge_core::TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
            "msgbatch_9",
        );
        let record = UsageRecord::from_event(&event, 0.01);
        assert!(record.is_batch);
        assert_eq!(record.batch_id.as_deref(), Some("msgbatch_9"));
        assert_eq!(record.task_type, TaskType::ReplyGeneration);
        assert!(record.created_at.ends_with('Z'));
    }
}
