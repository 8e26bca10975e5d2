// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message Batches support for [`AnthropicProvider`].

use async_trait::async_trait;
use postforge_core::{
    BatchItemRequest, BatchRecordOutcome, BatchResultRecord, BatchSubmission, BatchVendor,
    PostforgeError, TokenUsage, VendorBatchStatus,
};
use tracing::{debug, info, warn};

use crate::AnthropicProvider;
use crate::types::{BatchRequestItem, BatchResultBody, BatchResultLine, CreateBatchRequest};

#[async_trait]
impl BatchVendor for AnthropicProvider {
    async fn submit(&self, items: &[BatchItemRequest]) -> Result<BatchSubmission, PostforgeError> {
        let request = CreateBatchRequest {
            requests: items
                .iter()
                .map(|item| BatchRequestItem {
                    custom_id: item.custom_id.clone(),
                    params: self.to_message_request(&item.request),
                })
                .collect(),
        };

        let batch = self.client.create_batch(&request).await?;
        info!(batch_id = %batch.id, requests = items.len(), "anthropic batch created");
        Ok(BatchSubmission { batch_id: batch.id })
    }

    async fn status(&self, batch_id: &str) -> Result<VendorBatchStatus, PostforgeError> {
        let batch = self.client.get_batch(batch_id).await?;
        debug!(
            batch_id,
            processing_status = %batch.processing_status,
            succeeded = batch.request_counts.succeeded,
            errored = batch.request_counts.errored,
            "anthropic batch status"
        );
        Ok(map_processing_status(&batch.processing_status))
    }

    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResultRecord>, PostforgeError> {
        let body = self.client.batch_results(batch_id).await?;
        Ok(parse_results(batch_id, &body))
    }
}

/// Maps `processing_status` onto the coarse vendor status.
fn map_processing_status(status: &str) -> VendorBatchStatus {
    match status {
        "in_progress" | "canceling" => VendorBatchStatus::InProgress,
        "ended" => VendorBatchStatus::Ended,
        _ => VendorBatchStatus::Errored,
    }
}

/// Decodes a JSONL results body. Lines that fail to decode are skipped.
pub(crate) fn parse_results(batch_id: &str, body: &str) -> Vec<BatchResultRecord> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<BatchResultLine>(line) {
            Ok(line) => Some(to_record(line)),
            Err(e) => {
                warn!(batch_id, error = %e, "skipping undecodable batch result line");
                None
            }
        })
        .collect()
}

fn to_record(line: BatchResultLine) -> BatchResultRecord {
    let outcome = match line.result {
        BatchResultBody::Succeeded { message } => BatchRecordOutcome::Succeeded {
            text: message.text(),
            model: message.model,
            usage: TokenUsage {
                input_tokens: message.usage.input_tokens,
                output_tokens: message.usage.output_tokens,
            },
        },
        BatchResultBody::Errored { error } => BatchRecordOutcome::Failed {
            reason: error_reason(&error),
        },
        BatchResultBody::Canceled => BatchRecordOutcome::Failed {
            reason: "canceled".into(),
        },
        BatchResultBody::Expired => BatchRecordOutcome::Failed {
            reason: "expired".into(),
        },
    };
    BatchResultRecord {
        custom_id: line.custom_id,
        outcome,
    }
}

/// Pulls the innermost `message` out of an error envelope.
fn error_reason(error: &serde_json::Value) -> String {
    error
        .pointer("/error/message")
        .or_else(|| error.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
