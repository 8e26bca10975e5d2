// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget-gated synchronous generation.
//!
//! Every call goes: resolve provider -> budget gate -> vendor completion ->
//! candidate parsing -> best-effort usage logging.

use std::sync::Arc;

use postforge_core::{
    BestEffort, Candidate, CostCollaborator, GenerationRequest, PostforgeError, TokenUsage,
    UsageEvent,
};
use postforge_parser::CandidateParser;
use tracing::{debug, info, warn};

use crate::registry::ProviderRegistry;

/// A successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub provider: String,
    pub model: String,
    /// At most three parsed drafts.
    pub candidates: Vec<Candidate>,
    pub usage: TokenUsage,
    /// Whether the usage event reached the cost collaborator.
    pub usage_log: BestEffort<()>,
}

/// What a generation call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The budget gate refused the call; no vendor request was made.
    Declined { reason: String },
    Generated(Generation),
}

impl GenerationOutcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }

    pub fn generation(&self) -> Option<&Generation> {
        match self {
            Self::Generated(generation) => Some(generation),
            Self::Declined { .. } => None,
        }
    }
}

/// Runs generations against registered providers.
#[derive(Clone)]
pub struct Generator {
    registry: Arc<ProviderRegistry>,
    cost: Arc<dyn CostCollaborator>,
    parser: Arc<CandidateParser>,
}

impl Generator {
    pub fn new(registry: Arc<ProviderRegistry>, cost: Arc<dyn CostCollaborator>) -> Self {
        Self::with_parser(registry, cost, CandidateParser::standard())
    }

    pub fn with_parser(
        registry: Arc<ProviderRegistry>,
        cost: Arc<dyn CostCollaborator>,
        parser: CandidateParser,
    ) -> Self {
        Self {
            registry,
            cost,
            parser: Arc::new(parser),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generates up to three candidates with the provider named by `key`.
    ///
    /// Unknown keys and vendor failures are errors. A paused budget is a
    /// [`GenerationOutcome::Declined`], and a failing budget check lets the
    /// call through.
    pub async fn generate(
        &self,
        key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, PostforgeError> {
        let provider = self.registry.resolve(key)?;

        match self.cost.check_budget_status().await {
            Ok(status) if status.should_pause => {
                let reason = status
                    .reason
                    .unwrap_or_else(|| "budget exhausted".to_string());
                info!(provider = key, %reason, "generation declined by budget");
                return Ok(GenerationOutcome::Declined { reason });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(provider = key, error = %e, "budget check failed, proceeding");
            }
        }

        let response = provider.complete(request).await?;
        let candidates = self.parser.parse(&response.text);
        debug!(
            provider = provider.name(),
            model = %response.model,
            candidates = candidates.len(),
            "generation complete"
        );

        let event = UsageEvent::sync(
            provider.name(),
            &response.model,
            request.task_type,
            response.usage,
        );
        let usage_log = match self.cost.log_detailed_usage(&event).await {
            Ok(()) => BestEffort::Complete(()),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "failed to log usage");
                BestEffort::degraded((), e.to_string())
            }
        };

        Ok(GenerationOutcome::Generated(Generation {
            provider: provider.name().to_string(),
            model: response.model,
            candidates,
            usage: response.usage,
            usage_log,
        }))
    }
}
