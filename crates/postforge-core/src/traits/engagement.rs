// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-engagement lookup collaborator used by the analytics side.

use async_trait::async_trait;

use crate::error::PostforgeError;

/// Looks up external post ids an account has already replied to or quoted.
#[async_trait]
pub trait EngagementLookup: Send + Sync {
    async fn replied_or_quoted_ids(&self, account_id: &str) -> Result<Vec<String>, PostforgeError>;
}
