// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapter for Postforge.
//!
//! Implements [`ProviderAdapter`] over the Chat Completions API. Reasoning
//! models get `reasoning_effort: "high"` on analytical tasks only.

pub mod client;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use postforge_config::PostforgeConfig;
use postforge_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, PostforgeError, ProviderAdapter,
    ProviderResponse, TaskType, TokenUsage,
};
use postforge_resilience::{RetryOptions, Sleeper, TokioSleeper};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

/// Model prefixes of OpenAI's reasoning tier.
const HIGH_TIER_PREFIXES: &[&str] = &["o1", "o3", "o4", "gpt-5"];

/// OpenAI chat provider.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    default_model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(config: &PostforgeConfig) -> Result<Self, PostforgeError> {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        config: &PostforgeConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, PostforgeError> {
        let api_key = resolve_api_key(&config.openai.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            &config.openai.base_url,
            RetryOptions::from(&config.retry),
            sleeper,
        )?;

        info!(model = config.openai.default_model, "OpenAI provider initialized");

        Ok(Self {
            client,
            default_model: config.openai.default_model.clone(),
            max_tokens: config.openai.max_tokens,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Converts a [`GenerationRequest`] into a chat completion request.
    pub fn to_chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        let reasoning_effort = self
            .uses_extended_reasoning(&model, request.task_type)
            .then(|| "high".to_string());

        ChatRequest {
            model,
            messages,
            max_completion_tokens: if request.max_tokens == 0 {
                self.max_tokens
            } else {
                request.max_tokens
            },
            reasoning_effort,
        }
    }
}

fn is_high_tier(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    HIGH_TIER_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
impl ProviderAdapter for OpenAiProvider {
    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, PostforgeError> {
        let chat = self.to_chat_request(request);
        debug!(model = %chat.model, task_type = %request.task_type, "openai completion");
        let response = self.client.chat_completion(&chat).await?;

        Ok(ProviderResponse {
            text: response.text(),
            stop_reason: response.finish_reason(),
            usage: TokenUsage {
                input_tokens: response.usage.prompt_tokens,
                output_tokens: response.usage.completion_tokens,
            },
            id: response.id,
            model: response.model,
        })
    }

    fn uses_extended_reasoning(&self, model: &str, task_type: TaskType) -> bool {
        is_high_tier(model) && task_type.is_analytical()
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, PostforgeError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        PostforgeError::Config(
            "OpenAI API key not found. Set openai.api_key in config or OPENAI_API_KEY environment variable.".into(),
        )
    })
}
