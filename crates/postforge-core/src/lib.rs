// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Postforge.
//!
//! This crate provides the error type, the domain types shared by pattern
//! rotation, provider generation, and batch processing, and the traits every
//! vendor adapter and external collaborator implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PostforgeError;
pub use types::{
    AdapterType, BatchDraft, BatchItem, BatchItemRequest, BatchJob, BatchRecordOutcome,
    BatchResultRecord, BatchStatus, BatchSubmission, BestEffort, BudgetStatus, Candidate,
    GenerationHistoryEntry, GenerationRequest, HealthStatus, MAX_CANDIDATES, PatternCode,
    PatternFamily, PatternUsage, ProviderResponse, TaskType, TokenUsage, UsageEvent,
    VendorBatchStatus,
};

pub use traits::{
    BatchJobStore, BatchVendor, CostCollaborator, EngagementLookup, GenerationHistoryStore,
    PluginAdapter, ProviderAdapter,
};
