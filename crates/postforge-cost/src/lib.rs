// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost tracking, budget enforcement, and pricing for Postforge.
//!
//! - **Usage ledger**: one `usage_logs` row per vendor call or batch record
//! - **Budget tracker**: in-memory daily/monthly caps with 80% warnings
//! - **Pricing**: per-model rates with the batch discount
//! - **Cost tracker**: the [`postforge_core::CostCollaborator`] tying them together

pub mod budget;
pub mod ledger;
pub mod pricing;
pub mod tracker;

pub use budget::BudgetTracker;
pub use ledger::{UsageLedger, UsageRecord};
pub use tracker::CostTracker;
