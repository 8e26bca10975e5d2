// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end batch flow: Anthropic batch API (mocked over HTTP), SQLite job
//! store and cost ledger, driven through the batch processor.
//!
//! Each test creates an isolated TestHarness with a temp database.

use std::sync::Arc;

use postforge_anthropic::AnthropicProvider;
use postforge_batch::{BatchProcessor, SubmitOutcome};
use postforge_core::{BatchJob, BatchStatus, GenerationRequest, TaskType, TokenUsage};
use postforge_cost::pricing::{calculate_cost, get_pricing};
use postforge_resilience::RecordingSleeper;
use postforge_test_utils::TestHarness;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "claude-sonnet-4-20250514";
const BATCH_ID: &str = "msgbatch_e2e";

fn processor(harness: &TestHarness, server: &MockServer) -> BatchProcessor {
    let mut config = harness.config.clone();
    config.anthropic.api_key = Some("sk-test".into());
    config.anthropic.base_url = server.uri();
    let provider =
        AnthropicProvider::with_sleeper(&config, Arc::new(RecordingSleeper::new())).unwrap();
    BatchProcessor::new(
        Arc::new(provider),
        harness.store.clone(),
        harness.cost.clone(),
        &config.batch,
    )
}

fn request(prompt: &str, task_type: TaskType) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.into(),
        system_prompt: Some("You write short posts.".into()),
        model: MODEL.into(),
        max_tokens: 400,
        task_type,
    }
}

async fn mount_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/messages/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": BATCH_ID,
            "type": "message_batch",
            "processing_status": "in_progress"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, status: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/v1/messages/batches/{BATCH_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": BATCH_ID,
            "processing_status": status
        })));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

async fn mount_results(server: &MockServer, lines: &[serde_json::Value]) {
    let body: String = lines.iter().map(|line| format!("{line}\n")).collect();
    Mock::given(method("GET"))
        .and(path(format!("/v1/messages/batches/{BATCH_ID}/results")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn succeeded_line(custom_id: &str, text: &str, usage: TokenUsage) -> serde_json::Value {
    serde_json::json!({
        "custom_id": custom_id,
        "result": {
            "type": "succeeded",
            "message": {
                "id": "msg_1",
                "model": MODEL,
                "content": [{"type": "text", "text": text}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": usage.input_tokens, "output_tokens": usage.output_tokens}
            }
        }
    })
}

async fn submit(processor: &BatchProcessor, requests: Vec<GenerationRequest>) -> BatchJob {
    match processor.submit_batch(requests).await.unwrap() {
        SubmitOutcome::Submitted(job) => job,
        SubmitOutcome::Declined { reason } => panic!("declined: {reason}"),
    }
}

// ---- Test 1: submit, wait, complete ----

#[tokio::test]
async fn batch_flows_from_submission_to_drafts() {
    let server = MockServer::start().await;
    let harness = TestHarness::new().await;
    let processor = processor(&harness, &server);
    mount_create(&server).await;

    let job = submit(
        &processor,
        vec![
            request("launch teaser", TaskType::TweetGeneration),
            request("reply to @ana", TaskType::ReplyGeneration),
        ],
    )
    .await;
    assert_eq!(job.batch_id, BATCH_ID);
    assert_eq!(job.status, BatchStatus::Processing);

    // First pass: vendor still working.
    mount_status(&server, "in_progress", Some(1)).await;
    let report = processor.poll_batch_results().await.unwrap();
    assert_eq!(report.still_processing, 1);

    mount_status(&server, "ended", None).await;
    let usage = TokenUsage {
        input_tokens: 1_000,
        output_tokens: 200,
    };
    mount_results(
        &server,
        &[
            succeeded_line(
                &job.items[0].custom_id,
                "Pattern 1: Big news Monday.\nPattern 2: Something is coming.",
                usage,
            ),
            serde_json::json!({
                "custom_id": job.items[1].custom_id,
                "result": {"type": "errored", "error": {"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}}
            }),
        ],
    )
    .await;

    let report = processor.poll_batch_results().await.unwrap();
    assert_eq!(report.completed, 1);

    let stored = processor.get_job(BATCH_ID).await.unwrap().unwrap();
    assert_eq!(stored.status, BatchStatus::Completed);
    assert_eq!(stored.completed_count, 2);
    assert_eq!(stored.results[0].text, "Big news Monday.");
    assert_eq!(stored.results[1].label.as_deref(), Some("Pattern 2"));
    assert!(
        stored
            .results
            .iter()
            .all(|d| d.custom_id == job.items[0].custom_id)
    );

    let ledger = harness.cost.ledger();
    assert_eq!(ledger.batch_record_count(BATCH_ID).await.unwrap(), 1);
}

// ---- Test 2: batch usage is billed at the discounted rate, once ----

#[tokio::test]
async fn batch_usage_is_discounted_and_billed_once() {
    let server = MockServer::start().await;
    let harness = TestHarness::new().await;
    let processor = processor(&harness, &server);
    mount_create(&server).await;

    let job = submit(&processor, vec![request("weekly recap", TaskType::TweetGeneration)]).await;
    let usage = TokenUsage {
        input_tokens: 10_000,
        output_tokens: 2_000,
    };
    mount_status(&server, "ended", None).await;
    mount_results(
        &server,
        &[succeeded_line(&job.items[0].custom_id, "Recap posted.", usage)],
    )
    .await;

    processor.poll_batch_results().await.unwrap();
    processor.poll_batch_results().await.unwrap();

    let pricing = get_pricing("anthropic", MODEL);
    let expected = calculate_cost(&usage, &pricing, true);
    let full_price = calculate_cost(&usage, &pricing, false);
    let billed = harness.cost.ledger().batch_total(BATCH_ID).await.unwrap();

    assert!((billed - expected).abs() < 1e-9);
    assert!((billed * 2.0 - full_price).abs() < 1e-9);
    assert_eq!(harness.cost.ledger().batch_record_count(BATCH_ID).await.unwrap(), 1);
}

// ---- Test 3: vendor-side failure ----

#[tokio::test]
async fn errored_batch_is_marked_failed_without_fetching_results() {
    let server = MockServer::start().await;
    let harness = TestHarness::new().await;
    let processor = processor(&harness, &server);
    mount_create(&server).await;

    submit(&processor, vec![request("x", TaskType::TweetGeneration)]).await;
    mount_status(&server, "expired", None).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/messages/batches/{BATCH_ID}/results")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = processor.poll_batch_results().await.unwrap();
    assert_eq!(report.failed, 1);

    let stored = processor.get_job(BATCH_ID).await.unwrap().unwrap();
    assert_eq!(stored.status, BatchStatus::Failed);
    assert!(stored.results.is_empty());
}

// ---- Test 4: budget gate ----

#[tokio::test]
async fn exhausted_budget_declines_without_calling_vendor() {
    let server = MockServer::start().await;
    let harness = TestHarness::builder().with_budget(0.0).build().await.unwrap();
    let processor = processor(&harness, &server);
    Mock::given(method("POST"))
        .and(path("/v1/messages/batches"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = processor
        .submit_batch(vec![request("x", TaskType::TweetGeneration)])
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Declined { .. }));
    assert!(processor.get_history(5).await.unwrap().is_empty());
}
