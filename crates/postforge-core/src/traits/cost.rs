// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost and budget collaborator.

use async_trait::async_trait;

use crate::error::PostforgeError;
use crate::types::{BudgetStatus, UsageEvent};

/// Budget gate and usage logging.
///
/// `check_budget_status` must be consulted before any paid vendor call.
/// `log_detailed_usage` is best-effort: callers log and swallow its errors.
#[async_trait]
pub trait CostCollaborator: Send + Sync {
    async fn check_budget_status(&self) -> Result<BudgetStatus, PostforgeError>;

    async fn log_detailed_usage(&self, event: &UsageEvent) -> Result<(), PostforgeError>;
}
