// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-backed pattern rotation.
//!
//! Reads degrade to "no constraint" and writes are best-effort: this service
//! must never be the reason a generation request fails.

use std::sync::Arc;

use postforge_core::{BestEffort, GenerationHistoryStore, PatternUsage};
use tracing::{debug, warn};

use crate::constraints::{
    HISTORY_WINDOW, PatternConstraints, build_constraint_prompt_block, compute_constraints,
};

/// Pattern rotation for one store.
#[derive(Clone)]
pub struct PatternRotation {
    store: Arc<dyn GenerationHistoryStore>,
}

impl PatternRotation {
    pub fn new(store: Arc<dyn GenerationHistoryStore>) -> Self {
        Self { store }
    }

    /// Records the patterns a successful generation used.
    pub async fn log_pattern_usage(&self, account_id: &str, usage: &PatternUsage) -> BestEffort<()> {
        match self.store.append_usage(account_id, usage).await {
            Ok(()) => {
                debug!(account_id, "pattern usage logged");
                BestEffort::Complete(())
            }
            Err(e) => {
                warn!(account_id, error = %e, "failed to log pattern usage");
                BestEffort::degraded((), e.to_string())
            }
        }
    }

    /// Structured constraints for the account's next generation.
    pub async fn constraints_for(&self, account_id: &str) -> BestEffort<PatternConstraints> {
        match self.store.recent_history(account_id, HISTORY_WINDOW).await {
            Ok(history) => BestEffort::Complete(compute_constraints(&history)),
            Err(e) => {
                warn!(account_id, error = %e, "history unavailable, generating without pattern constraints");
                BestEffort::degraded(PatternConstraints::default(), e.to_string())
            }
        }
    }

    /// Prompt block for the account's next generation; empty when
    /// unconstrained or when history cannot be read.
    pub async fn get_pattern_constraint_block(&self, account_id: &str) -> BestEffort<String> {
        match self.constraints_for(account_id).await {
            BestEffort::Complete(constraints) => {
                BestEffort::Complete(build_constraint_prompt_block(&constraints))
            }
            BestEffort::Degraded { reason, .. } => BestEffort::Degraded {
                value: String::new(),
                reason,
            },
        }
    }
}
