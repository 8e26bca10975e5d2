// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost collaborator that records usage events in memory.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use postforge_core::{BudgetStatus, CostCollaborator, PostforgeError, UsageEvent};

/// Records every usage event and reports a scripted budget status.
pub struct RecordingCostCollaborator {
    status: Mutex<BudgetStatus>,
    events: Mutex<Vec<UsageEvent>>,
    fail_budget: AtomicBool,
    fail_logging: AtomicBool,
    budget_checks: AtomicUsize,
}

impl RecordingCostCollaborator {
    /// A collaborator with an unlimited budget.
    pub fn new() -> Self {
        Self {
            status: Mutex::new(BudgetStatus::unlimited()),
            events: Mutex::new(Vec::new()),
            fail_budget: AtomicBool::new(false),
            fail_logging: AtomicBool::new(false),
            budget_checks: AtomicUsize::new(0),
        }
    }

    /// A collaborator whose budget is paused.
    pub fn paused(reason: &str) -> Self {
        let collaborator = Self::new();
        if let Ok(mut status) = collaborator.status.try_lock() {
            status.should_pause = true;
            status.reason = Some(reason.to_string());
        }
        collaborator
    }

    pub async fn set_paused(&self, paused: bool) {
        let mut status = self.status.lock().await;
        status.should_pause = paused;
        status.reason = paused.then(|| "daily budget exhausted".to_string());
    }

    /// Makes `check_budget_status` fail.
    pub fn fail_budget_checks(&self) {
        self.fail_budget.store(true, Ordering::SeqCst);
    }

    /// Makes `log_detailed_usage` fail.
    pub fn fail_usage_logging(&self) {
        self.fail_logging.store(true, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().await.clone()
    }

    pub fn budget_checks(&self) -> usize {
        self.budget_checks.load(Ordering::SeqCst)
    }
}

impl Default for RecordingCostCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CostCollaborator for RecordingCostCollaborator {
    async fn check_budget_status(&self) -> Result<BudgetStatus, PostforgeError> {
        self.budget_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_budget.load(Ordering::SeqCst) {
            return Err(PostforgeError::Internal("budget backend unavailable".into()));
        }
        Ok(self.status.lock().await.clone())
    }

    async fn log_detailed_usage(&self, event: &UsageEvent) -> Result<(), PostforgeError> {
        if self.fail_logging.load(Ordering::SeqCst) {
            return Err(PostforgeError::storage(std::io::Error::other(
                "usage_logs unavailable",
            )));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
