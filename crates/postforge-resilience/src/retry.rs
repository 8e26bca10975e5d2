// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded exponential backoff for rate-limited vendor calls.
//!
//! Only HTTP 429 is retried. Any other non-2xx status fails immediately with
//! [`PostforgeError::UpstreamApi`], and connection-level failures surface as
//! [`PostforgeError::Http`] without a retry.

use std::sync::Arc;
use std::time::Duration;

use postforge_config::model::RetryConfig;
use postforge_core::PostforgeError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::sleeper::{Sleeper, TokioSleeper};

/// Retry budget for rate-limited responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// Attempts allowed after the initial one.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later retry.
    pub initial_backoff: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryOptions {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

impl RetryOptions {
    /// Delay after failed attempt number `attempt` (zero-based):
    /// `initial_backoff * 2^attempt`, saturating.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }
}

/// Sends `request`, retrying on 429 with exponential backoff.
///
/// The builder is cloned for every attempt, so its body must be cloneable
/// (JSON and text bodies are).
pub async fn fetch_with_retry(
    request: RequestBuilder,
    options: &RetryOptions,
    sleeper: &dyn Sleeper,
) -> Result<Response, PostforgeError> {
    let mut attempt: u32 = 0;
    loop {
        let builder = request.try_clone().ok_or_else(|| {
            PostforgeError::Internal("request body cannot be cloned for retry".into())
        })?;

        let response = builder.send().await.map_err(|e| PostforgeError::Http {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        let endpoint = response.url().path().to_string();
        debug!(%status, attempt, endpoint = %endpoint, "vendor response received");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            if attempt >= options.max_retries {
                warn!(endpoint = %endpoint, attempts = attempt + 1, "rate limit retries exhausted");
                return Err(PostforgeError::RateLimitExceeded {
                    endpoint,
                    attempts: attempt + 1,
                });
            }
            let delay = options.backoff_for(attempt);
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            warn!(
                endpoint = %endpoint,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                retry_after = retry_after.as_deref().unwrap_or("-"),
                "rate limited, backing off"
            );
            sleeper.sleep(delay).await;
            attempt += 1;
            continue;
        }

        let message = response.text().await.unwrap_or_default();
        return Err(PostforgeError::UpstreamApi {
            status: status.as_u16(),
            message,
        });
    }
}

/// A `reqwest::Client` bundled with the retry policy and sleeper that every
/// vendor call shares.
#[derive(Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    options: RetryOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingClient {
    pub fn new(client: reqwest::Client, options: RetryOptions) -> Self {
        Self::with_sleeper(client, options, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        client: reqwest::Client,
        options: RetryOptions,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            client,
            options,
            sleeper,
        }
    }

    /// The underlying client, for building requests.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// Sends with retry and returns the successful response.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, PostforgeError> {
        fetch_with_retry(request, &self.options, self.sleeper.as_ref()).await
    }

    /// Sends with retry and returns the successful body as text.
    pub async fn send_text(&self, request: RequestBuilder) -> Result<String, PostforgeError> {
        self.send(request)
            .await?
            .text()
            .await
            .map_err(|e| PostforgeError::Http {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Sends with retry and decodes the successful body as JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PostforgeError> {
        let body = self.send_text(request).await?;
        serde_json::from_str(&body).map_err(|e| PostforgeError::Provider {
            message: format!("failed to parse vendor response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
