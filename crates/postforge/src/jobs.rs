// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postforge jobs` and `postforge job` command implementations.
//!
//! Read-only views over stored batch jobs. With `--json` the stored records
//! are printed as-is for scripting.

use postforge_config::PostforgeConfig;
use postforge_core::{BatchJob, BatchJobStore, PostforgeError};
use postforge_storage::SqliteStore;

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, PostforgeError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PostforgeError::Internal(format!("failed to serialize output: {e}")))
}

/// One summary line per job.
fn format_job_line(job: &BatchJob) -> String {
    format!(
        "{:<36} {:<10} {:<11} {:>3}/{:<3} {}",
        job.batch_id,
        job.provider,
        job.status.to_string(),
        job.completed_count,
        job.request_count,
        job.created_at
    )
}

fn format_job_detail(job: &BatchJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("batch:     {}\n", job.batch_id));
    out.push_str(&format!("provider:  {}\n", job.provider));
    out.push_str(&format!("status:    {}\n", job.status));
    out.push_str(&format!("task:      {}\n", job.task_type));
    out.push_str(&format!("requests:  {}\n", job.request_count));
    out.push_str(&format!("drafts:    {}\n", job.completed_count));
    out.push_str(&format!("created:   {}\n", job.created_at));
    if let Some(completed_at) = &job.completed_at {
        out.push_str(&format!("finished:  {completed_at}\n"));
    }
    if let Some(error) = &job.error {
        out.push_str(&format!("error:     {error}\n"));
    }
    for draft in &job.results {
        let label = draft.label.as_deref().unwrap_or("-");
        out.push_str(&format!("\n[{} {}]\n{}\n", draft.custom_id, label, draft.text));
    }
    out
}

/// Lists recent jobs, newest first.
pub async fn run_jobs(
    config: &PostforgeConfig,
    limit: Option<usize>,
    json: bool,
) -> Result<(), PostforgeError> {
    let store = SqliteStore::open(&config.storage).await?;
    let jobs = store
        .list_jobs(limit.unwrap_or(config.batch.history_limit))
        .await?;

    if json {
        println!("{}", to_json(&jobs)?);
    } else if jobs.is_empty() {
        println!("no batch jobs");
    } else {
        for job in &jobs {
            println!("{}", format_job_line(job));
        }
    }
    Ok(())
}

/// Shows one job with its drafts.
pub async fn run_job(
    config: &PostforgeConfig,
    batch_id: &str,
    json: bool,
) -> Result<(), PostforgeError> {
    let store = SqliteStore::open(&config.storage).await?;
    let Some(job) = store.get_job(batch_id).await? else {
        return Err(PostforgeError::Config(format!(
            "no batch job with id `{batch_id}`"
        )));
    };

    if json {
        println!("{}", to_json(&job)?);
    } else {
        print!("{}", format_job_detail(&job));
    }
    Ok(())
}
