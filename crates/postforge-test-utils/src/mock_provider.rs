// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use postforge_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, PostforgeError, ProviderAdapter,
    ProviderResponse, TaskType, TokenUsage,
};

/// Canned usage reported for every mock completion.
pub const MOCK_USAGE: TokenUsage = TokenUsage {
    input_tokens: 10,
    output_tokens: 20,
};

enum Reply {
    Text(String),
    Status(u16),
}

/// A mock LLM provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    name: String,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::named("mock-provider")
    }

    /// Create a mock provider reporting `name` as its adapter name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        if let Ok(mut queue) = provider.replies.try_lock() {
            queue.extend(responses.into_iter().map(Reply::Text));
        }
        provider
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Reply::Text(text.into()));
    }

    /// Queue an upstream failure with the given HTTP status.
    pub async fn add_error(&self, status: u16) {
        self.replies.lock().await.push_back(Reply::Status(status));
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PostforgeError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, PostforgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        let reply = self.replies.lock().await.pop_front();
        let text = match reply {
            Some(Reply::Text(text)) => text,
            Some(Reply::Status(status)) => {
                return Err(PostforgeError::UpstreamApi {
                    status,
                    message: "mock upstream failure".to_string(),
                });
            }
            None => "mock response".to_string(),
        };

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model.clone()
        };

        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            model,
            text,
            stop_reason: Some("end_turn".to_string()),
            usage: MOCK_USAGE,
        })
    }

    fn uses_extended_reasoning(&self, _model: &str, task_type: TaskType) -> bool {
        task_type.is_analytical()
    }
}
