// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached, budget-aware engagement lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postforge_core::{CostCollaborator, EngagementLookup, PostforgeError};
use postforge_resilience::TtlCache;
use tracing::{debug, warn};

/// Wraps an [`EngagementLookup`] with a per-account TTL cache.
///
/// When the budget is paused the lookup returns an empty list without calling
/// through, since analytics calls are paid.
pub struct CachedEngagementLookup {
    inner: Arc<dyn EngagementLookup>,
    cost: Arc<dyn CostCollaborator>,
    cache: TtlCache<String, Vec<String>>,
}

impl CachedEngagementLookup {
    pub fn new(
        inner: Arc<dyn EngagementLookup>,
        cost: Arc<dyn CostCollaborator>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            cost,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn cached_accounts(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl EngagementLookup for CachedEngagementLookup {
    async fn replied_or_quoted_ids(&self, account_id: &str) -> Result<Vec<String>, PostforgeError> {
        if let Some(ids) = self.cache.get(&account_id.to_string()) {
            debug!(account_id, "engagement cache hit");
            return Ok(ids);
        }

        match self.cost.check_budget_status().await {
            Ok(status) if status.should_pause => {
                debug!(account_id, "budget paused, skipping engagement lookup");
                return Ok(Vec::new());
            }
            Ok(_) => {}
            Err(e) => warn!(account_id, error = %e, "budget check failed, proceeding"),
        }

        let inner = self.inner.clone();
        let owned = account_id.to_string();
        self.cache
            .get_or_try_insert_with(owned.clone(), || async move {
                inner.replied_or_quoted_ids(&owned).await
            })
            .await
    }
}
