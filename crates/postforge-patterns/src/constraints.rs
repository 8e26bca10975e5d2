// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constraint computation over recent generation history.
//!
//! Everything here is pure: history in, constraints out. Each family is
//! constrained independently of the others.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use postforge_core::{GenerationHistoryEntry, PatternCode, PatternFamily};
use serde::Serialize;

use crate::registry::{PatternInfo, catalog, display_name};

/// Entries whose opening pattern is forbidden next.
pub const OPENING_WINDOW: usize = 2;
/// Entries scanned for repeated development patterns.
pub const DEVELOPMENT_WINDOW: usize = 3;
/// Occurrences within [`DEVELOPMENT_WINDOW`] that forbid a development pattern.
pub const DEVELOPMENT_REPEAT_THRESHOLD: usize = 2;
/// Entries whose closing pattern is forbidden next.
pub const CLOSING_WINDOW: usize = 2;
/// Entries whose expressions are to be avoided.
pub const EXPRESSION_WINDOW: usize = 5;
/// History entries needed to evaluate every rule.
pub const HISTORY_WINDOW: usize = EXPRESSION_WINDOW;

/// Forbidden choices for the next generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternConstraints {
    pub forbidden_opening: BTreeSet<PatternCode>,
    pub forbidden_development: BTreeSet<PatternCode>,
    pub forbidden_closing: BTreeSet<PatternCode>,
    /// De-duplicated, in first-seen order (newest entry first).
    pub avoid_expressions: Vec<String>,
}

impl PatternConstraints {
    /// True when no family is constrained and there is nothing to avoid.
    pub fn is_empty(&self) -> bool {
        self.forbidden_opening.is_empty()
            && self.forbidden_development.is_empty()
            && self.forbidden_closing.is_empty()
            && self.avoid_expressions.is_empty()
    }

    pub fn forbidden(&self, family: PatternFamily) -> &BTreeSet<PatternCode> {
        match family {
            PatternFamily::Opening => &self.forbidden_opening,
            PatternFamily::Development => &self.forbidden_development,
            PatternFamily::Closing => &self.forbidden_closing,
        }
    }
}

/// Computes constraints from history ordered newest first.
///
/// Missing pattern values are ignored; they are never counted or forbidden.
pub fn compute_constraints(history: &[GenerationHistoryEntry]) -> PatternConstraints {
    let forbidden_opening = history
        .iter()
        .take(OPENING_WINDOW)
        .filter_map(|e| e.opening.clone())
        .collect();

    let forbidden_closing = history
        .iter()
        .take(CLOSING_WINDOW)
        .filter_map(|e| e.closing.clone())
        .collect();

    let mut development_counts: HashMap<&PatternCode, usize> = HashMap::new();
    for code in history
        .iter()
        .take(DEVELOPMENT_WINDOW)
        .filter_map(|e| e.development.as_ref())
    {
        *development_counts.entry(code).or_default() += 1;
    }
    let forbidden_development = development_counts
        .into_iter()
        .filter(|(_, count)| *count >= DEVELOPMENT_REPEAT_THRESHOLD)
        .map(|(code, _)| code.clone())
        .collect();

    let mut avoid_expressions: Vec<String> = Vec::new();
    for expression in history
        .iter()
        .take(EXPRESSION_WINDOW)
        .flat_map(|e| e.expressions.iter())
    {
        if !avoid_expressions.contains(expression) {
            avoid_expressions.push(expression.clone());
        }
    }

    PatternConstraints {
        forbidden_opening,
        forbidden_development,
        forbidden_closing,
        avoid_expressions,
    }
}

/// Patterns still on offer per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailablePatterns {
    pub opening: Vec<&'static PatternInfo>,
    pub development: Vec<&'static PatternInfo>,
    pub closing: Vec<&'static PatternInfo>,
}

impl AvailablePatterns {
    pub fn family(&self, family: PatternFamily) -> &[&'static PatternInfo] {
        match family {
            PatternFamily::Opening => &self.opening,
            PatternFamily::Development => &self.development,
            PatternFamily::Closing => &self.closing,
        }
    }
}

fn available_in(family: PatternFamily, forbidden: &BTreeSet<PatternCode>) -> Vec<&'static PatternInfo> {
    let all = catalog(family);
    let allowed: Vec<_> = all
        .iter()
        .filter(|p| !forbidden.iter().any(|f| f.as_str() == p.code))
        .collect();
    if allowed.is_empty() {
        all.iter().collect()
    } else {
        allowed
    }
}

/// Catalog minus forbidden codes, per family. A family that would be emptied
/// falls back to its full catalog.
pub fn available_patterns(constraints: &PatternConstraints) -> AvailablePatterns {
    AvailablePatterns {
        opening: available_in(PatternFamily::Opening, &constraints.forbidden_opening),
        development: available_in(PatternFamily::Development, &constraints.forbidden_development),
        closing: available_in(PatternFamily::Closing, &constraints.forbidden_closing),
    }
}

/// Renders constraints as a prompt directive. Empty when nothing is active.
pub fn build_constraint_prompt_block(constraints: &PatternConstraints) -> String {
    if constraints.is_empty() {
        return String::new();
    }

    let mut block = String::from("## Pattern constraints\n");
    for (family, label) in [
        (PatternFamily::Opening, "opening"),
        (PatternFamily::Development, "development"),
        (PatternFamily::Closing, "closing"),
    ] {
        let forbidden = constraints.forbidden(family);
        if forbidden.is_empty() {
            continue;
        }
        let names: Vec<String> = forbidden.iter().map(display_name).collect();
        let _ = writeln!(
            block,
            "- Do not use these {label} patterns: {}",
            names.join(", ")
        );
    }
    if !constraints.avoid_expressions.is_empty() {
        let quoted: Vec<String> = constraints
            .avoid_expressions
            .iter()
            .map(|x| format!("\"{x}\""))
            .collect();
        let _ = writeln!(block, "- Avoid these expressions: {}", quoted.join(", "));
    }
    block
}
