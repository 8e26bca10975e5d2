// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection and generation for Postforge.
//!
//! This crate provides:
//! - [`ProviderRegistry`]: closed set of provider adapters built from config
//! - [`Generator`]: budget-gated generation returning parsed candidates
//! - [`CachedEngagementLookup`]: TTL-cached engagement lookups behind the budget gate

pub mod engagement;
pub mod generator;
pub mod registry;

pub use engagement::CachedEngagementLookup;
pub use generator::{Generation, GenerationOutcome, Generator};
pub use registry::{ProviderKind, ProviderRegistry};
