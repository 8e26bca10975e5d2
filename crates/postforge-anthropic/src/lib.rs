// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude adapter for Postforge.
//!
//! Implements [`ProviderAdapter`] over the Messages API and [`BatchVendor`]
//! over the Message Batches API. Extended thinking is only requested for
//! Opus-class models on analytical tasks.
//!
//! [`BatchVendor`]: postforge_core::BatchVendor

pub mod batch;
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

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ThinkingConfig};

/// Name fragment identifying high-tier Anthropic models.
const HIGH_TIER_MARKER: &str = "opus";

/// Anthropic Claude provider.
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    default_model: String,
    max_tokens: u32,
    thinking_budget_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a provider from configuration, sleeping on the tokio clock
    /// between rate-limit retries.
    pub fn new(config: &PostforgeConfig) -> Result<Self, PostforgeError> {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    /// Creates a provider with an explicit backoff sleeper.
    pub fn with_sleeper(
        config: &PostforgeConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, PostforgeError> {
        let api_key = resolve_api_key(&config.anthropic.api_key)?;
        let client = AnthropicClient::new(
            &api_key,
            &config.anthropic.api_version,
            &config.anthropic.base_url,
            RetryOptions::from(&config.retry),
            sleeper,
        )?;

        info!(
            model = config.anthropic.default_model,
            "Anthropic provider initialized"
        );

        Ok(Self {
            client,
            default_model: config.anthropic.default_model.clone(),
            max_tokens: config.anthropic.max_tokens,
            thinking_budget_tokens: config.anthropic.thinking_budget_tokens,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Converts a [`GenerationRequest`] into a Messages API request.
    ///
    /// Empty model and zero max tokens fall back to configured defaults. When
    /// extended thinking applies, `max_tokens` is raised by the thinking
    /// budget so the visible answer keeps its full allowance.
    pub fn to_message_request(&self, request: &GenerationRequest) -> MessageRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };
        let max_tokens = if request.max_tokens == 0 {
            self.max_tokens
        } else {
            request.max_tokens
        };

        let (max_tokens, thinking) = if self.uses_extended_reasoning(&model, request.task_type) {
            (
                max_tokens.saturating_add(self.thinking_budget_tokens),
                Some(ThinkingConfig::enabled(self.thinking_budget_tokens)),
            )
        } else {
            (max_tokens, None)
        };

        MessageRequest {
            model,
            messages: vec![ApiMessage::user(request.prompt.clone())],
            system: request.system_prompt.clone().filter(|s| !s.is_empty()),
            max_tokens,
            thinking,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PostforgeError> {
        // Constructing the client validated the credentials' shape; a live
        // call would spend tokens.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, PostforgeError> {
        let api_request = self.to_message_request(request);
        debug!(
            model = %api_request.model,
            task_type = %request.task_type,
            thinking = api_request.thinking.is_some(),
            "anthropic completion"
        );
        let response = self.client.complete_message(&api_request).await?;

        Ok(ProviderResponse {
            text: response.text(),
            id: response.id,
            model: response.model,
            stop_reason: response.stop_reason,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }

    fn uses_extended_reasoning(&self, model: &str, task_type: TaskType) -> bool {
        model.to_ascii_lowercase().contains(HIGH_TIER_MARKER) && task_type.is_analytical()
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, PostforgeError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        PostforgeError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}
