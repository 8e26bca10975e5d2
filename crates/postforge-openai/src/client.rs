// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Chat Completions API.

use std::sync::Arc;
use std::time::Duration;

use postforge_core::PostforgeError;
use postforge_resilience::{RetryOptions, RetryingClient, Sleeper};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// HTTP client for OpenAI API communication.
#[derive(Clone)]
pub struct OpenAiClient {
    http: RetryingClient,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client sending `Authorization: Bearer <api_key>`.
    pub fn new(
        api_key: &str,
        base_url: &str,
        retry: RetryOptions,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, PostforgeError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| PostforgeError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

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

    /// Sends one chat completion request.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, PostforgeError> {
        debug!(
            model = %request.model,
            reasoning_effort = request.reasoning_effort.as_deref().unwrap_or("none"),
            "sending chat completion"
        );
        let builder = self
            .http
            .http()
            .post(format!("{}{CHAT_COMPLETIONS_PATH}", self.base_url))
            .json(request);
        self.http.send_json(builder).await.map_err(describe_api_error)
    }
}

fn describe_api_error(err: PostforgeError) -> PostforgeError {
    match err {
        PostforgeError::UpstreamApi { status, message } => {
            let message = match serde_json::from_str::<ApiErrorResponse>(&message) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err
                        .error
                        .code
                        .or(api_err.error.type_)
                        .unwrap_or_else(|| "unknown".into()),
                    api_err.error.message
                ),
                Err(_) => message,
            };
            PostforgeError::UpstreamApi { status, message }
        }
        other => other,
    }
}
