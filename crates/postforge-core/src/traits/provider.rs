// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM vendors (Anthropic, OpenAI).

use async_trait::async_trait;

use crate::error::PostforgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, ProviderResponse, TaskType};

/// Adapter for synchronous LLM generation.
///
/// Implementations build the vendor payload, send it through the resilient
/// call layer, and return the raw completion text. Candidate parsing, budget
/// gating, and usage logging happen once, above this trait.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a single generation request and returns the full completion.
    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, PostforgeError>;

    /// Whether extended reasoning is enabled for this model/task combination.
    fn uses_extended_reasoning(&self, model: &str, task_type: TaskType) -> bool;

    /// Maps a caller hint to a task type.
    fn infer_task_type(&self, hint: Option<&str>) -> TaskType {
        TaskType::from_hint(hint)
    }
}
