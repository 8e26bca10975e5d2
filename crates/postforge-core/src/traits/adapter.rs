// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by vendor adapters.

use async_trait::async_trait;

use crate::error::PostforgeError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for provider and batch vendor adapters.
///
/// Provides identity and a health check that must not spend tokens.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the stable key of this adapter (e.g. `anthropic`).
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, PostforgeError>;
}
