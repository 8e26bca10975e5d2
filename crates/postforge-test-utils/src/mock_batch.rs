// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock batch vendor with scripted statuses and result files.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use postforge_core::{
    AdapterType, BatchItemRequest, BatchRecordOutcome, BatchResultRecord, BatchSubmission,
    BatchVendor, HealthStatus, PluginAdapter, PostforgeError, TokenUsage, VendorBatchStatus,
};

/// Builds a succeeded result record.
pub fn succeeded(custom_id: &str, text: &str, usage: TokenUsage) -> BatchResultRecord {
    BatchResultRecord {
        custom_id: custom_id.to_string(),
        outcome: BatchRecordOutcome::Succeeded {
            model: "mock-model".to_string(),
            text: text.to_string(),
            usage,
        },
    }
}

/// Builds a failed result record.
pub fn failed(custom_id: &str, reason: &str) -> BatchResultRecord {
    BatchResultRecord {
        custom_id: custom_id.to_string(),
        outcome: BatchRecordOutcome::Failed {
            reason: reason.to_string(),
        },
    }
}

#[derive(Default)]
struct State {
    next_ids: Vec<String>,
    submissions: Vec<Vec<BatchItemRequest>>,
    statuses: HashMap<String, VendorBatchStatus>,
    results: HashMap<String, Vec<BatchResultRecord>>,
    failing_status: HashSet<String>,
    reject_submit: Option<u16>,
}

/// An in-memory [`BatchVendor`].
///
/// Unknown batches report `InProgress`. Batch ids are taken from
/// [`MockBatchVendor::queue_batch_id`] or generated.
pub struct MockBatchVendor {
    state: Mutex<State>,
    status_calls: AtomicUsize,
    results_calls: AtomicUsize,
}

impl MockBatchVendor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            status_calls: AtomicUsize::new(0),
            results_calls: AtomicUsize::new(0),
        }
    }

    /// Id returned by the next `submit`.
    pub async fn queue_batch_id(&self, batch_id: &str) {
        self.state.lock().await.next_ids.push(batch_id.to_string());
    }

    /// Makes every following `submit` fail with `status`.
    pub async fn reject_submissions(&self, status: u16) {
        self.state.lock().await.reject_submit = Some(status);
    }

    pub async fn set_status(&self, batch_id: &str, status: VendorBatchStatus) {
        self.state
            .lock()
            .await
            .statuses
            .insert(batch_id.to_string(), status);
    }

    /// Marks a batch ended with the given result records.
    pub async fn finish(&self, batch_id: &str, records: Vec<BatchResultRecord>) {
        let mut state = self.state.lock().await;
        state
            .statuses
            .insert(batch_id.to_string(), VendorBatchStatus::Ended);
        state.results.insert(batch_id.to_string(), records);
    }

    /// Makes status queries for `batch_id` fail.
    pub async fn fail_status(&self, batch_id: &str) {
        self.state
            .lock()
            .await
            .failing_status
            .insert(batch_id.to_string());
    }

    pub async fn submissions(&self) -> Vec<Vec<BatchItemRequest>> {
        self.state.lock().await.submissions.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn results_calls(&self) -> usize {
        self.results_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBatchVendor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBatchVendor {
    fn name(&self) -> &str {
        "mock-batch"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::BatchVendor
    }

    async fn health_check(&self) -> Result<HealthStatus, PostforgeError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl BatchVendor for MockBatchVendor {
    async fn submit(&self, items: &[BatchItemRequest]) -> Result<BatchSubmission, PostforgeError> {
        let mut state = self.state.lock().await;
        if let Some(status) = state.reject_submit {
            return Err(PostforgeError::UpstreamApi {
                status,
                message: "mock batch rejected".to_string(),
            });
        }
        state.submissions.push(items.to_vec());
        let batch_id = if state.next_ids.is_empty() {
            format!("mockbatch_{}", uuid::Uuid::new_v4().simple())
        } else {
            state.next_ids.remove(0)
        };
        Ok(BatchSubmission { batch_id })
    }

    async fn status(&self, batch_id: &str) -> Result<VendorBatchStatus, PostforgeError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().await;
        if state.failing_status.contains(batch_id) {
            return Err(PostforgeError::UpstreamApi {
                status: 500,
                message: format!("status lookup failed for {batch_id}"),
            });
        }
        Ok(state
            .statuses
            .get(batch_id)
            .copied()
            .unwrap_or(VendorBatchStatus::InProgress))
    }

    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResultRecord>, PostforgeError> {
        self.results_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .await
            .results
            .get(batch_id)
            .cloned()
            .unwrap_or_default())
    }
}
