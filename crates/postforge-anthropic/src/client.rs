// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages and Message Batches APIs.
//!
//! Provides [`AnthropicClient`], which handles authentication headers and
//! endpoint construction. Every call goes through the shared
//! [`RetryingClient`], so 429s back off and other failures surface at once.

use std::sync::Arc;
use std::time::Duration;

use postforge_core::PostforgeError;
use postforge_resilience::{RetryOptions, RetryingClient, Sleeper};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, CreateBatchRequest, MessageBatch, MessageRequest, MessageResponse};

const MESSAGES_PATH: &str = "/v1/messages";
const BATCHES_PATH: &str = "/v1/messages/batches";

/// HTTP client for Anthropic API communication.
#[derive(Clone)]
pub struct AnthropicClient {
    http: RetryingClient,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key for authentication
    /// * `api_version` - API version string (e.g., "2023-06-01")
    /// * `base_url` - API origin, e.g. `https://api.anthropic.com`
    pub fn new(
        api_key: &str,
        api_version: &str,
        base_url: &str,
        retry: RetryOptions,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, PostforgeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                PostforgeError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                PostforgeError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| PostforgeError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http: RetryingClient::with_sleeper(client, retry, sleeper),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a single Messages API request.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, PostforgeError> {
        debug!(model = %request.model, max_tokens = request.max_tokens, "sending message request");
        let builder = self.http.http().post(self.url(MESSAGES_PATH)).json(request);
        self.http.send_json(builder).await.map_err(describe_api_error)
    }

    /// Submits a Message Batch.
    pub async fn create_batch(
        &self,
        request: &CreateBatchRequest,
    ) -> Result<MessageBatch, PostforgeError> {
        debug!(requests = request.requests.len(), "creating message batch");
        let builder = self.http.http().post(self.url(BATCHES_PATH)).json(request);
        self.http.send_json(builder).await.map_err(describe_api_error)
    }

    /// Retrieves a Message Batch.
    pub async fn get_batch(&self, batch_id: &str) -> Result<MessageBatch, PostforgeError> {
        let builder = self
            .http
            .http()
            .get(self.url(&format!("{BATCHES_PATH}/{batch_id}")));
        self.http.send_json(builder).await.map_err(describe_api_error)
    }

    /// Downloads the JSONL results of an ended batch.
    pub async fn batch_results(&self, batch_id: &str) -> Result<String, PostforgeError> {
        let builder = self
            .http
            .http()
            .get(self.url(&format!("{BATCHES_PATH}/{batch_id}/results")));
        self.http.send_text(builder).await.map_err(describe_api_error)
    }
}

/// Rewrites an upstream error body into `type: message` form when it is an
/// Anthropic error object.
fn describe_api_error(err: PostforgeError) -> PostforgeError {
    match err {
        PostforgeError::UpstreamApi { status, message } => {
            let message = match serde_json::from_str::<ApiErrorResponse>(&message) {
                Ok(api_err) => format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => message,
            };
            PostforgeError::UpstreamApi { status, message }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use postforge_resilience::RecordingSleeper;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, sleeper: RecordingSleeper) -> AnthropicClient {
        AnthropicClient::new(
            "test-api-key",
            "2023-06-01",
            base_url,
            RetryOptions::default(),
            Arc::new(sleeper),
        )
        .unwrap()
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage::user("Hello")],
            system: None,
            max_tokens: 1024,
            thinking: None,
        }
    }

    fn message_body(id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_body("msg_test", "Hi there!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), RecordingSleeper::new());
        let result = client.complete_message(&test_request()).await.unwrap();

        assert_eq!(result.id, "msg_test");
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(result.text(), "Hi there!");
    }

    #[tokio::test]
    async fn complete_message_backs_off_on_429() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_body("msg_retry", "After retry")))
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = test_client(&server.uri(), sleeper.clone());
        let result = client.complete_message(&test_request()).await.unwrap();

        assert_eq!(result.id, "msg_retry");
        assert_eq!(
            sleeper.durations(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn complete_message_fails_on_400_with_described_error() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), RecordingSleeper::new());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        let msg = err.to_string();
        assert!(msg.contains("invalid_request_error"), "got: {msg}");
        assert!(msg.contains("Bad model"), "got: {msg}");
    }

    #[tokio::test]
    async fn overloaded_is_not_retried() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "overloaded_error", "message": "Service overloaded"}
        });
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = test_client(&server.uri(), sleeper.clone());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(529));
        assert!(sleeper.durations().is_empty());
    }

    #[tokio::test]
    async fn client_sends_correct_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_body("msg_headers", "ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), RecordingSleeper::new());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/messages/batches/msgbatch_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msgbatch_1",
                "processing_status": "ended"
            })))
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()), RecordingSleeper::new());
        let batch = client.get_batch("msgbatch_1").await.unwrap();
        assert_eq!(batch.processing_status, "ended");
    }

    #[test]
    fn invalid_header_value_is_a_config_error() {
        let err = AnthropicClient::new(
            "bad\nkey",
            "2023-06-01",
            "http://localhost",
            RetryOptions::default(),
            Arc::new(RecordingSleeper::new()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, PostforgeError::Config(_)));
    }
}
