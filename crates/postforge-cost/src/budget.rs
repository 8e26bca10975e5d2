// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget tracking with daily and monthly caps.
//!
//! Keeps in-memory running totals checked against the caps in `CostConfig`.
//! Crossing 80% of a cap logs a warning; reaching a cap reports
//! `should_pause`. Budget overrun is a normal outcome, not an error.
//!
//! On restart, [`BudgetTracker::from_ledger`] re-hydrates totals from the
//! usage ledger so enforcement survives process restarts.

use chrono::{Datelike, Utc};
use postforge_config::model::CostConfig;
use postforge_core::{BudgetStatus, PostforgeError};
use tracing::warn;

use crate::ledger::UsageLedger;

const WARN_RATIO: f64 = 0.8;

/// In-memory budget tracker with daily and monthly spending caps.
#[derive(Debug)]
pub struct BudgetTracker {
    daily_total_usd: f64,
    monthly_total_usd: f64,
    daily_cap: Option<f64>,
    monthly_cap: Option<f64>,
    /// Day-of-year, for daily reset detection.
    current_day: u32,
    current_month: u32,
}

impl BudgetTracker {
    /// A tracker with zero totals.
    pub fn new(config: &CostConfig) -> Self {
        let now = Utc::now();
        Self {
            daily_total_usd: 0.0,
            monthly_total_usd: 0.0,
            daily_cap: config.daily_budget_usd,
            monthly_cap: config.monthly_budget_usd,
            current_day: now.ordinal(),
            current_month: now.month(),
        }
    }

    /// A tracker seeded with today's and this month's ledger totals.
    pub async fn from_ledger(
        config: &CostConfig,
        ledger: &UsageLedger,
    ) -> Result<Self, PostforgeError> {
        let now = Utc::now();
        let daily_total = ledger.daily_total(&now.format("%Y-%m-%d").to_string()).await?;
        let monthly_total = ledger.monthly_total(&now.format("%Y-%m").to_string()).await?;

        Ok(Self {
            daily_total_usd: daily_total,
            monthly_total_usd: monthly_total,
            ..Self::new(config)
        })
    }

    /// Current budget status. Warns once spend reaches 80% of a cap.
    pub fn status(&mut self) -> BudgetStatus {
        self.maybe_reset();

        let mut reason = None;
        if let Some(cap) = self.daily_cap {
            if self.daily_total_usd >= cap {
                reason = Some(format!(
                    "daily budget of ${cap:.2} reached; resumes at midnight UTC"
                ));
            } else if self.daily_total_usd >= cap * WARN_RATIO {
                warn!(
                    daily_total = self.daily_total_usd,
                    daily_cap = cap,
                    "approaching daily budget cap (80%+)"
                );
            }
        }
        if reason.is_none()
            && let Some(cap) = self.monthly_cap
        {
            if self.monthly_total_usd >= cap {
                reason = Some(format!(
                    "monthly budget of ${cap:.2} reached; resumes next month"
                ));
            } else if self.monthly_total_usd >= cap * WARN_RATIO {
                warn!(
                    monthly_total = self.monthly_total_usd,
                    monthly_cap = cap,
                    "approaching monthly budget cap (80%+)"
                );
            }
        }

        BudgetStatus {
            should_pause: reason.is_some(),
            daily_spent_usd: self.daily_total_usd,
            monthly_spent_usd: self.monthly_total_usd,
            reason,
        }
    }

    /// Adds a cost to both running totals.
    pub fn record_cost(&mut self, cost_usd: f64) {
        self.maybe_reset();
        self.daily_total_usd += cost_usd;
        self.monthly_total_usd += cost_usd;
    }

    fn maybe_reset(&mut self) {
        let now = Utc::now();
        if now.ordinal() != self.current_day {
            self.daily_total_usd = 0.0;
            self.current_day = now.ordinal();
        }
        if now.month() != self.current_month {
            self.monthly_total_usd = 0.0;
            self.current_month = now.month();
        }
    }

    pub fn daily_total(&self) -> f64 {
        self.daily_total_usd
    }

    pub fn monthly_total(&self) -> f64 {
        self.monthly_total_usd
    }
}
