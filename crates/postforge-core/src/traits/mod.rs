// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter and collaborator trait definitions.
//!
//! Vendor-facing adapters extend the [`PluginAdapter`] base trait. External
//! collaborators (stores, cost tracking, engagement lookup) are narrow traits
//! injected as `Arc<dyn ...>` handles. All use `#[async_trait]` for dynamic
//! dispatch.

pub mod adapter;
pub mod batch;
pub mod cost;
pub mod engagement;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use batch::BatchVendor;
pub use cost::CostCollaborator;
pub use engagement::EngagementLookup;
pub use provider::ProviderAdapter;
pub use storage::{BatchJobStore, GenerationHistoryStore};
