// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Postforge.

use thiserror::Error;

/// The primary error type used across all Postforge crates.
#[derive(Debug, Error)]
pub enum PostforgeError {
    /// Configuration errors (invalid TOML, missing credentials, bad caller input).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors that are not HTTP status failures (malformed body, etc.).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-level failure before any HTTP status was received.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The vendor kept answering 429 after the retry budget was spent.
    #[error("rate limit exceeded for {endpoint} after {attempts} attempts")]
    RateLimitExceeded { endpoint: String, attempts: u32 },

    /// The vendor answered with a non-429, non-2xx status.
    #[error("upstream API error ({status}): {message}")]
    UpstreamApi { status: u16, message: String },

    /// The requested provider key is not part of the closed provider set.
    #[error("unknown provider `{key}`")]
    UnknownProvider { key: String },

    /// A batch job transition that would leave a terminal state or skip a step.
    #[error("invalid batch transition for {batch_id}: {from} -> {to}")]
    InvalidTransition {
        batch_id: String,
        from: String,
        to: String,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PostforgeError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// HTTP status carried by this error, if it came from a vendor response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamApi { status, .. } => Some(*status),
            Self::RateLimitExceeded { .. } => Some(429),
            _ => None,
        }
    }
}
