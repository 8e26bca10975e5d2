// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`CostCollaborator`] backed by the usage ledger and budget tracker.

use async_trait::async_trait;
use postforge_config::model::CostConfig;
use postforge_core::{BudgetStatus, CostCollaborator, PostforgeError, TokenUsage, UsageEvent};
use postforge_storage::Database;
use tokio::sync::Mutex;
use tracing::debug;

use crate::budget::BudgetTracker;
use crate::ledger::{UsageLedger, UsageRecord};
use crate::pricing::{calculate_cost, get_pricing};

/// Prices each usage event, persists it, and keeps budget totals current.
pub struct CostTracker {
    ledger: UsageLedger,
    budget: Mutex<BudgetTracker>,
    track_tokens: bool,
}

impl CostTracker {
    pub fn new(config: &CostConfig, ledger: UsageLedger, budget: BudgetTracker) -> Self {
        Self {
            ledger,
            budget: Mutex::new(budget),
            track_tokens: config.track_tokens,
        }
    }

    /// Builds a tracker on `db`, seeding budget totals from the ledger.
    pub async fn open(config: &CostConfig, db: &Database) -> Result<Self, PostforgeError> {
        let ledger = UsageLedger::from_database(db);
        let budget = BudgetTracker::from_ledger(config, &ledger).await?;
        Ok(Self::new(config, ledger, budget))
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }
}

#[async_trait]
impl CostCollaborator for CostTracker {
    async fn check_budget_status(&self) -> Result<BudgetStatus, PostforgeError> {
        Ok(self.budget.lock().await.status())
    }

    async fn log_detailed_usage(&self, event: &UsageEvent) -> Result<(), PostforgeError> {
        let usage = TokenUsage {
            input_tokens: event.input_tokens,
            output_tokens: event.output_tokens,
        };
        let pricing = get_pricing(&event.provider, &event.model);
        let cost_usd = calculate_cost(&usage, &pricing, event.is_batch);

        self.budget.lock().await.record_cost(cost_usd);

        if self.track_tokens {
            self.ledger
                .record(&UsageRecord::from_event(event, cost_usd))
                .await?;
        } else {
            debug!(cost_usd, "token tracking disabled, usage not persisted");
        }
        Ok(())
    }
}
