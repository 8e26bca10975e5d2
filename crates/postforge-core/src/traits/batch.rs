// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch vendor trait: the submit/status/results endpoint triple.

use async_trait::async_trait;

use crate::error::PostforgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BatchItemRequest, BatchResultRecord, BatchSubmission, VendorBatchStatus};

/// A vendor that accepts asynchronous bulk generation jobs.
#[async_trait]
pub trait BatchVendor: PluginAdapter {
    /// Submits all items as a single vendor batch.
    async fn submit(&self, items: &[BatchItemRequest]) -> Result<BatchSubmission, PostforgeError>;

    /// Queries the vendor-side processing status.
    async fn status(&self, batch_id: &str) -> Result<VendorBatchStatus, PostforgeError>;

    /// Fetches and decodes the line-delimited result records of an ended batch.
    async fn results(&self, batch_id: &str) -> Result<Vec<BatchResultRecord>, PostforgeError>;
}
