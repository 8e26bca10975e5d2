// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use postforge_config::PostforgeConfig;
use postforge_core::{GenerationRequest, ProviderAdapter, TaskType};
use postforge_openai::OpenAiProvider;
use postforge_resilience::RecordingSleeper;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer, sleeper: RecordingSleeper) -> OpenAiProvider {
    let mut config = PostforgeConfig::default();
    config.openai.api_key = Some("sk-test".into());
    config.openai.base_url = server.uri();
    config.retry.initial_backoff_ms = 500;
    OpenAiProvider::with_sleeper(&config, Arc::new(sleeper)).unwrap()
}

fn completion(model: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-9",
        "object": "chat.completion",
        "model": model,
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 40, "completion_tokens": 25, "total_tokens": 65}
    })
}

#[tokio::test]
async fn analytical_task_on_reasoning_model_requests_high_effort() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "o3-mini",
            "reasoning_effort": "high"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("o3-mini", "Competitors post mostly threads.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server, RecordingSleeper::new());
    let response = provider
        .complete(&GenerationRequest {
            prompt: "Analyze these competitor posts".into(),
            system_prompt: None,
            model: "o3-mini".into(),
            max_tokens: 2000,
            task_type: TaskType::CompetitorAnalysis,
        })
        .await
        .unwrap();

    assert_eq!(response.text, "Competitors post mostly threads.");
    assert_eq!(response.usage.input_tokens, 40);
    assert_eq!(response.usage.output_tokens, 25);
    assert_eq!(response.stop_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn rate_limit_then_success_uses_configured_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "20"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("gpt-4o-mini", "1. hi")))
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::new();
    let provider = provider(&server, sleeper.clone());
    let response = provider
        .complete(&GenerationRequest {
            prompt: "Write a tweet".into(),
            system_prompt: Some("Be witty".into()),
            model: String::new(),
            max_tokens: 0,
            task_type: TaskType::TweetGeneration,
        })
        .await
        .unwrap();

    assert_eq!(response.text, "1. hi");
    // Retry-After is advisory; the computed backoff governs.
    assert_eq!(sleeper.durations(), vec![Duration::from_millis(500)]);
}
