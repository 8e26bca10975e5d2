// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, positive
//! intervals, non-negative budgets, and batch providers that actually
//! support batches.

use crate::diagnostic::ConfigError;
use crate::model::PostforgeConfig;

/// Provider keys accepted in `[batch] provider`.
pub const BATCH_PROVIDERS: &[&str] = &["anthropic"];

/// Validates a deserialized configuration.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &PostforgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    for (key, value) in [
        ("cost.daily_budget_usd", config.cost.daily_budget_usd),
        ("cost.monthly_budget_usd", config.cost.monthly_budget_usd),
    ] {
        if let Some(v) = value
            && (v < 0.0 || !v.is_finite())
        {
            fail(format!("{key} must be a non-negative number, got {v}"));
        }
    }

    if config.anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens must be at least 1".to_string());
    }
    if config.openai.max_tokens == 0 {
        fail("openai.max_tokens must be at least 1".to_string());
    }
    if config.anthropic.thinking_budget_tokens < 1024 {
        fail(format!(
            "anthropic.thinking_budget_tokens must be at least 1024, got {}",
            config.anthropic.thinking_budget_tokens
        ));
    }

    for (key, url) in [
        ("anthropic.base_url", &config.anthropic.base_url),
        ("openai.base_url", &config.openai.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} must be an http(s) URL, got `{url}`"));
        }
    }

    if config.retry.initial_backoff_ms == 0 {
        fail("retry.initial_backoff_ms must be at least 1".to_string());
    }

    if !BATCH_PROVIDERS.contains(&config.batch.provider.as_str()) {
        fail(format!(
            "batch.provider `{}` does not support batches (supported: {})",
            config.batch.provider,
            BATCH_PROVIDERS.join(", ")
        ));
    }
    if config.batch.poll_interval_secs == 0 {
        fail("batch.poll_interval_secs must be at least 1".to_string());
    }
    if config.batch.lease_secs == 0 {
        fail("batch.lease_secs must be at least 1".to_string());
    }
    if config.batch.history_limit == 0 {
        fail("batch.history_limit must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
