// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern rotation for Postforge.
//!
//! Tracks the stylistic fingerprint (opening, development, closing pattern and
//! notable expressions) of recent posts per account and turns it into a set of
//! forbidden choices for the next generation, rendered as a prompt directive.

pub mod constraints;
pub mod registry;
pub mod rotation;

pub use constraints::{
    AvailablePatterns, PatternConstraints, available_patterns, build_constraint_prompt_block,
    compute_constraints,
};
pub use registry::{PatternInfo, catalog, lookup};
pub use rotation::PatternRotation;
