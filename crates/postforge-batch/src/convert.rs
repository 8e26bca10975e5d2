// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns vendor result records into drafts and usage events.

use postforge_core::{
    BatchDraft, BatchJob, BatchRecordOutcome, BatchResultRecord, TaskType, UsageEvent,
};
use postforge_parser::CandidateParser;
use tracing::{debug, warn};

/// Drafts and usage derived from one ended batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Materialized {
    pub drafts: Vec<BatchDraft>,
    /// One event per succeeded record.
    pub usage: Vec<UsageEvent>,
    pub failed_records: usize,
}

/// Task type recorded for `custom_id`, falling back to the job's.
fn task_type_for(job: &BatchJob, custom_id: &str) -> TaskType {
    match job.item(custom_id) {
        Some(item) => item.task_type,
        None => {
            warn!(batch_id = %job.batch_id, custom_id, "result for unknown custom_id");
            job.task_type
        }
    }
}

/// Segments every succeeded record into drafts and collects its usage.
///
/// A single record may hold several numbered variants; each segment becomes
/// its own draft tagged with the record's `custom_id`. Failed records yield
/// neither drafts nor usage.
pub fn materialize(
    job: &BatchJob,
    records: &[BatchResultRecord],
    parser: &CandidateParser,
) -> Materialized {
    let mut out = Materialized::default();

    for record in records {
        match &record.outcome {
            BatchRecordOutcome::Succeeded { model, text, usage } => {
                let task_type = task_type_for(job, &record.custom_id);
                out.usage.push(UsageEvent::batch(
                    &job.provider,
                    model,
                    task_type,
                    *usage,
                    &job.batch_id,
                ));
                out.drafts.extend(parser.parse(text).into_iter().map(|candidate| BatchDraft {
                    custom_id: record.custom_id.clone(),
                    task_type,
                    text: candidate.text,
                    label: candidate.label,
                }));
            }
            BatchRecordOutcome::Failed { reason } => {
                debug!(
                    batch_id = %job.batch_id,
                    custom_id = %record.custom_id,
                    %reason,
                    "batch record failed"
                );
                out.failed_records += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use postforge_core::{BatchItem, BatchStatus, TokenUsage};

    fn job() -> BatchJob {
        BatchJob {
            batch_id: "b1".into(),
            provider: "anthropic".into(),
            status: BatchStatus::Processing,
            task_type: TaskType::TweetGeneration,
            request_count: 2,
            completed_count: 0,
            items: vec![
                BatchItem {
                    custom_id: "r1".into(),
                    task_type: TaskType::TweetGeneration,
                    model: "m".into(),
                },
                BatchItem {
                    custom_id: "r2".into(),
                    task_type: TaskType::ReplyGeneration,
                    model: "m".into(),
                },
            ],
            results: vec![],
            error: None,
            created_at: "2026-01-01T00:00:00Z".into(),
            completed_at: None,
        }
    }

    fn ok(custom_id: &str, text: &str) -> BatchResultRecord {
        BatchResultRecord {
            custom_id: custom_id.into(),
            outcome: BatchRecordOutcome::Succeeded {
                model: "claude-sonnet-4-20250514".into(),
                text: text.into(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
            },
        }
    }

    #[test]
    fn numbered_record_splits_into_tagged_drafts() {
        let records = [ok("r1", "1. First take\n2. Second take"), ok("r2", "Sure thing!")];
        let out = materialize(&job(), &records, &CandidateParser::segmenting());

        assert_eq!(out.drafts.len(), 3);
        assert_eq!(out.drafts[0].text, "First take");
        assert_eq!(out.drafts[1].custom_id, "r1");
        assert_eq!(out.drafts[2].task_type, TaskType::ReplyGeneration);
        assert_eq!(out.drafts[2].text, "Sure thing!");
        assert_eq!(out.usage.len(), 2);
        assert!(out.usage.iter().all(|e| e.is_batch && e.batch_id.as_deref() == Some("b1")));
    }

    #[test]
    fn failed_records_produce_nothing() {
        let records = [BatchResultRecord {
            custom_id: "r1".into(),
            outcome: BatchRecordOutcome::Failed {
                reason: "expired".into(),
            },
        }];
        let out = materialize(&job(), &records, &CandidateParser::segmenting());
        assert!(out.drafts.is_empty());
        assert!(out.usage.is_empty());
        assert_eq!(out.failed_records, 1);
    }

    #[test]
    fn unknown_custom_id_uses_job_task_type() {
        let out = materialize(&job(), &[ok("zzz", "hello")], &CandidateParser::segmenting());
        assert_eq!(out.drafts[0].task_type, TaskType::TweetGeneration);
        assert_eq!(out.usage[0].task_type, TaskType::TweetGeneration);
    }
}
