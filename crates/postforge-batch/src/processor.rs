// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch job submission and polling.
//!
//! `poll_batch_results` is the only code path that moves a job out of
//! `processing`. A pass is single-flight within the process, and each job is
//! leased in the store so separate processes never drive the same job.

use std::sync::Arc;
use std::time::Duration;

use postforge_config::model::BatchConfig;
use postforge_core::{
    BatchItem, BatchItemRequest, BatchJob, BatchJobStore, BatchStatus, BatchVendor,
    CostCollaborator, GenerationRequest, PostforgeError, VendorBatchStatus,
};
use postforge_parser::CandidateParser;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::convert::materialize;

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The budget gate refused the submission; nothing was sent or stored.
    Declined { reason: String },
    Submitted(BatchJob),
}

impl SubmitOutcome {
    pub fn job(&self) -> Option<&BatchJob> {
        match self {
            Self::Submitted(job) => Some(job),
            Self::Declined { .. } => None,
        }
    }
}

/// What one poll pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Another pass was already running; nothing was examined.
    pub skipped: bool,
    pub examined: usize,
    pub completed: usize,
    pub failed: usize,
    pub still_processing: usize,
    /// Jobs another poller currently holds.
    pub leased_elsewhere: usize,
    /// Jobs whose processing raised an error this pass.
    pub errors: usize,
}

enum JobPoll {
    Completed { drafts: usize },
    Failed,
    StillProcessing,
    LeasedElsewhere,
    /// The store refused the transition because the job already left `processing`.
    AlreadySettled,
}

/// Drives batch jobs through submission and polling.
pub struct BatchProcessor {
    vendor: Arc<dyn BatchVendor>,
    store: Arc<dyn BatchJobStore>,
    cost: Arc<dyn CostCollaborator>,
    parser: CandidateParser,
    lease: Duration,
    owner: String,
    poll_guard: Mutex<()>,
}

impl BatchProcessor {
    pub fn new(
        vendor: Arc<dyn BatchVendor>,
        store: Arc<dyn BatchJobStore>,
        cost: Arc<dyn CostCollaborator>,
        config: &BatchConfig,
    ) -> Self {
        Self {
            vendor,
            store,
            cost,
            parser: CandidateParser::segmenting(),
            lease: Duration::from_secs(config.lease_secs),
            owner: format!("poller-{}", uuid::Uuid::new_v4()),
            poll_guard: Mutex::new(()),
        }
    }

    /// Lease owner id used by this processor.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Submits all requests as one vendor batch and persists the job.
    ///
    /// Each request gets a fresh `custom_id`. If the vendor rejects the batch
    /// the error is returned and nothing is persisted.
    pub async fn submit_batch(
        &self,
        requests: Vec<GenerationRequest>,
    ) -> Result<SubmitOutcome, PostforgeError> {
        let Some(first) = requests.first() else {
            return Err(PostforgeError::Config(
                "a batch needs at least one request".into(),
            ));
        };
        let task_type = first.task_type;

        match self.cost.check_budget_status().await {
            Ok(status) if status.should_pause => {
                let reason = status
                    .reason
                    .unwrap_or_else(|| "budget exhausted".to_string());
                info!(%reason, "batch submission declined by budget");
                return Ok(SubmitOutcome::Declined { reason });
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "budget check failed, proceeding"),
        }

        let items: Vec<BatchItemRequest> = requests
            .into_iter()
            .map(|request| BatchItemRequest {
                custom_id: uuid::Uuid::new_v4().to_string(),
                request,
            })
            .collect();

        let submission = self.vendor.submit(&items).await?;

        let job = BatchJob {
            batch_id: submission.batch_id,
            provider: self.vendor.name().to_string(),
            status: BatchStatus::Processing,
            task_type,
            request_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            completed_count: 0,
            items: items
                .iter()
                .map(|item| BatchItem {
                    custom_id: item.custom_id.clone(),
                    task_type: item.request.task_type,
                    model: item.request.model.clone(),
                })
                .collect(),
            results: Vec::new(),
            error: None,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            completed_at: None,
        };

        self.store.insert_job(&job).await?;
        info!(
            batch_id = %job.batch_id,
            provider = %job.provider,
            requests = job.request_count,
            "batch submitted"
        );
        Ok(SubmitOutcome::Submitted(job))
    }

    /// Runs one polling pass over every processing job.
    ///
    /// Returns immediately with `skipped` set if another pass is in flight.
    /// Per-job failures are logged and counted; only failing to list jobs
    /// aborts the pass.
    pub async fn poll_batch_results(&self) -> Result<PollReport, PostforgeError> {
        let Ok(_guard) = self.poll_guard.try_lock() else {
            debug!("poll pass already running, skipping");
            return Ok(PollReport {
                skipped: true,
                ..PollReport::default()
            });
        };

        let jobs = self.store.processing_jobs().await?;
        let mut report = PollReport::default();

        for job in &jobs {
            report.examined += 1;
            match self.poll_job(job).await {
                Ok(JobPoll::Completed { drafts }) => {
                    info!(batch_id = %job.batch_id, drafts, "batch completed");
                    report.completed += 1;
                }
                Ok(JobPoll::Failed) => report.failed += 1,
                Ok(JobPoll::StillProcessing) => report.still_processing += 1,
                Ok(JobPoll::LeasedElsewhere) => report.leased_elsewhere += 1,
                Ok(JobPoll::AlreadySettled) => {
                    debug!(batch_id = %job.batch_id, "job settled by another poller");
                }
                Err(e) => {
                    warn!(batch_id = %job.batch_id, error = %e, "batch poll failed");
                    report.errors += 1;
                    self.release(&job.batch_id).await;
                }
            }
        }

        debug!(?report, "poll pass finished");
        Ok(report)
    }

    async fn poll_job(&self, job: &BatchJob) -> Result<JobPoll, PostforgeError> {
        if !self
            .store
            .try_lease_job(&job.batch_id, &self.owner, self.lease)
            .await?
        {
            return Ok(JobPoll::LeasedElsewhere);
        }

        match self.vendor.status(&job.batch_id).await? {
            VendorBatchStatus::InProgress => {
                self.release(&job.batch_id).await;
                Ok(JobPoll::StillProcessing)
            }
            VendorBatchStatus::Errored => {
                let moved = self
                    .store
                    .fail_job(&job.batch_id, "vendor reported the batch as errored")
                    .await?;
                if !moved {
                    return Ok(JobPoll::AlreadySettled);
                }
                info!(batch_id = %job.batch_id, "batch failed");
                Ok(JobPoll::Failed)
            }
            VendorBatchStatus::Ended => {
                let records = self.vendor.results(&job.batch_id).await?;
                let out = materialize(job, &records, &self.parser);

                if !self.store.complete_job(&job.batch_id, &out.drafts).await? {
                    return Ok(JobPoll::AlreadySettled);
                }

                // Logged after the transition so a re-polled job is never billed twice.
                for event in &out.usage {
                    if let Err(e) = self.cost.log_detailed_usage(event).await {
                        warn!(
                            batch_id = %job.batch_id,
                            error = %e,
                            "failed to log batch usage"
                        );
                    }
                }
                if out.failed_records > 0 {
                    info!(
                        batch_id = %job.batch_id,
                        failed_records = out.failed_records,
                        "batch ended with failed records"
                    );
                }

                Ok(JobPoll::Completed {
                    drafts: out.drafts.len(),
                })
            }
        }
    }

    async fn release(&self, batch_id: &str) {
        if let Err(e) = self.store.release_lease(batch_id, &self.owner).await {
            warn!(batch_id, error = %e, "failed to release batch lease");
        }
    }

    /// Jobs newest first.
    pub async fn get_history(&self, limit: usize) -> Result<Vec<BatchJob>, PostforgeError> {
        self.store.list_jobs(limit).await
    }

    pub async fn get_job(&self, batch_id: &str) -> Result<Option<BatchJob>, PostforgeError> {
        self.store.get_job(batch_id).await
    }
}
