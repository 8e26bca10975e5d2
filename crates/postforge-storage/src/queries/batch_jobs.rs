// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch job persistence, leases, and draft materialization.
//!
//! Every status write is guarded by `WHERE status = 'processing'`, so a job
//! in a terminal state is never overwritten.

use std::str::FromStr;
use std::time::Duration;

use postforge_core::{BatchDraft, BatchJob, BatchStatus, PostforgeError, TaskType};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

const JOB_COLUMNS: &str = "batch_id, provider, status, task_type, request_count, \
     completed_count, items, results, error, created_at, completed_at";

/// Timestamp format shared by every column written from Rust. Lexically
/// ordered, so lease expiry can be compared as text.
pub(crate) fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Expiry of a lease taken at `now`, capped at the last instant with a
/// four-digit year so stored deadlines keep sorting as text.
fn lease_deadline(
    now: chrono::DateTime<chrono::Utc>,
    lease: Duration,
) -> chrono::DateTime<chrono::Utc> {
    let latest = chrono::NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
        .map(|t| t.and_utc());
    let until = chrono::Duration::from_std(lease)
        .ok()
        .and_then(|d| now.checked_add_signed(d));
    match (until, latest) {
        (Some(until), Some(latest)) => until.min(latest),
        (None, Some(latest)) => latest,
        (until, None) => until.unwrap_or(now),
    }
}

fn now() -> String {
    timestamp(chrono::Utc::now())
}

struct JobRow {
    batch_id: String,
    provider: String,
    status: String,
    task_type: String,
    request_count: u32,
    completed_count: u32,
    items: String,
    results: String,
    error: Option<String>,
    created_at: String,
    completed_at: Option<String>,
}

impl JobRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            batch_id: row.get(0)?,
            provider: row.get(1)?,
            status: row.get(2)?,
            task_type: row.get(3)?,
            request_count: row.get(4)?,
            completed_count: row.get(5)?,
            items: row.get(6)?,
            results: row.get(7)?,
            error: row.get(8)?,
            created_at: row.get(9)?,
            completed_at: row.get(10)?,
        })
    }

    fn into_job(self) -> Result<BatchJob, PostforgeError> {
        Ok(BatchJob {
            status: BatchStatus::from_str(&self.status).map_err(PostforgeError::storage)?,
            task_type: TaskType::from_str(&self.task_type).map_err(PostforgeError::storage)?,
            items: serde_json::from_str(&self.items).map_err(PostforgeError::storage)?,
            results: serde_json::from_str(&self.results).map_err(PostforgeError::storage)?,
            batch_id: self.batch_id,
            provider: self.provider,
            request_count: self.request_count,
            completed_count: self.completed_count,
            error: self.error,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

/// Inserts a new job row. A job cannot be created already terminal.
pub async fn insert_job(db: &Database, job: &BatchJob) -> Result<(), PostforgeError> {
    if job.status.is_terminal() {
        return Err(PostforgeError::InvalidTransition {
            batch_id: job.batch_id.clone(),
            from: "new".to_string(),
            to: job.status.to_string(),
        });
    }
    let items = serde_json::to_string(&job.items).map_err(PostforgeError::storage)?;
    let results = serde_json::to_string(&job.results).map_err(PostforgeError::storage)?;
    let job = job.clone();

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO batch_jobs (batch_id, provider, status, task_type, request_count,
                    completed_count, items, results, error, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    job.batch_id,
                    job.provider,
                    job.status.to_string(),
                    job.task_type.to_string(),
                    job.request_count,
                    job.completed_count,
                    items,
                    results,
                    job.error,
                    job.created_at,
                    job.completed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

async fn select_jobs(
    db: &Database,
    clause: &'static str,
    limit: Option<i64>,
) -> Result<Vec<BatchJob>, PostforgeError> {
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<JobRow>, rusqlite::Error> {
            let sql = format!("SELECT {JOB_COLUMNS} FROM batch_jobs {clause} LIMIT ?1");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![limit.unwrap_or(-1)], JobRow::from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;
    rows.into_iter().map(JobRow::into_job).collect()
}

/// All jobs in `processing`, oldest first.
pub async fn processing_jobs(db: &Database) -> Result<Vec<BatchJob>, PostforgeError> {
    select_jobs(
        db,
        "WHERE status = 'processing' ORDER BY created_at ASC, rowid ASC",
        None,
    )
    .await
}

/// Jobs newest first.
pub async fn list_jobs(db: &Database, limit: usize) -> Result<Vec<BatchJob>, PostforgeError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    select_jobs(db, "ORDER BY created_at DESC, rowid DESC", Some(limit)).await
}

/// One job by vendor batch id.
pub async fn get_job(db: &Database, batch_id: &str) -> Result<Option<BatchJob>, PostforgeError> {
    let batch_id = batch_id.to_string();
    let row = db
        .connection()
        .call(move |conn| -> Result<Option<JobRow>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {JOB_COLUMNS} FROM batch_jobs WHERE batch_id = ?1"),
                params![batch_id],
                JobRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    row.map(JobRow::into_job).transpose()
}

/// Takes or renews a lease on a processing job.
///
/// Succeeds when the job is processing and either unleased, already leased
/// by `owner`, or leased by someone whose lease has expired.
pub async fn try_lease_job(
    db: &Database,
    batch_id: &str,
    owner: &str,
    lease: Duration,
) -> Result<bool, PostforgeError> {
    let batch_id = batch_id.to_string();
    let owner = owner.to_string();
    let now = chrono::Utc::now();
    let (now, until) = (timestamp(now), timestamp(lease_deadline(now, lease)));

    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE batch_jobs SET lease_owner = ?2, lease_until = ?3
                 WHERE batch_id = ?1 AND status = 'processing'
                   AND (lease_owner IS NULL OR lease_owner = ?2 OR lease_until < ?4)",
                params![batch_id, owner, until, now],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Drops a lease held by `owner`. A no-op for leases held by others.
pub async fn release_lease(db: &Database, batch_id: &str, owner: &str) -> Result<(), PostforgeError> {
    let batch_id = batch_id.to_string();
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE batch_jobs SET lease_owner = NULL, lease_until = NULL
                 WHERE batch_id = ?1 AND lease_owner = ?2",
                params![batch_id, owner],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Moves a processing job to `completed` and writes its drafts, in one
/// transaction. Returns `false` without writing anything if the job was not
/// processing.
pub async fn complete_job(
    db: &Database,
    batch_id: &str,
    drafts: &[BatchDraft],
) -> Result<bool, PostforgeError> {
    let results = serde_json::to_string(drafts).map_err(PostforgeError::storage)?;
    let completed_count = u32::try_from(drafts.len()).unwrap_or(u32::MAX);
    let batch_id = batch_id.to_string();
    let drafts = drafts.to_vec();
    let completed_at = now();

    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE batch_jobs SET status = 'completed', completed_count = ?2, results = ?3,
                    completed_at = ?4, error = NULL, lease_owner = NULL, lease_until = NULL
                 WHERE batch_id = ?1 AND status = 'processing'",
                params![batch_id, completed_count, results, completed_at],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            {
                let mut insert = tx.prepare(
                    "INSERT INTO drafts (batch_id, custom_id, task_type, text, label)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for draft in &drafts {
                    insert.execute(params![
                        batch_id,
                        draft.custom_id,
                        draft.task_type.to_string(),
                        draft.text,
                        draft.label,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Moves a processing job to `failed`. Returns `false` if it was not processing.
pub async fn fail_job(db: &Database, batch_id: &str, reason: &str) -> Result<bool, PostforgeError> {
    let batch_id = batch_id.to_string();
    let reason = reason.to_string();
    let completed_at = now();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE batch_jobs SET status = 'failed', error = ?2, completed_at = ?3,
                    lease_owner = NULL, lease_until = NULL
                 WHERE batch_id = ?1 AND status = 'processing'",
                params![batch_id, reason, completed_at],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Draft rows materialized for one batch, in insertion order.
pub async fn list_drafts(db: &Database, batch_id: &str) -> Result<Vec<BatchDraft>, PostforgeError> {
    let batch_id = batch_id.to_string();
    type Row = (String, String, String, Option<String>);
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<Row>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT custom_id, task_type, text, label FROM drafts
                 WHERE batch_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![batch_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(custom_id, task_type, text, label)| {
            Ok(BatchDraft {
                custom_id,
                task_type: TaskType::from_str(&task_type).map_err(PostforgeError::storage)?,
                text,
                label,
            })
        })
        .collect()
}
