// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static catalog of stylistic pattern codes.

use postforge_core::{PatternCode, PatternFamily};

/// Human-readable metadata for one pattern code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternInfo {
    pub code: &'static str,
    pub family: PatternFamily,
    pub name: &'static str,
    pub description: &'static str,
}

impl PatternInfo {
    pub fn pattern_code(&self) -> PatternCode {
        PatternCode::from(self.code)
    }
}

const fn info(
    code: &'static str,
    family: PatternFamily,
    name: &'static str,
    description: &'static str,
) -> PatternInfo {
    PatternInfo {
        code,
        family,
        name,
        description,
    }
}

use PatternFamily::{Closing, Development, Opening};

static OPENING: [PatternInfo; 5] = [
    info("O-A", Opening, "Question hook", "Open with a question the reader wants answered."),
    info("O-B", Opening, "Bold claim", "Lead with a confident, slightly provocative statement."),
    info("O-C", Opening, "Personal anecdote", "Start from a concrete first-person moment."),
    info("O-D", Opening, "Statistic lead", "Open on a number or data point."),
    info("O-E", Opening, "Contrarian take", "Challenge a common belief up front."),
];

static DEVELOPMENT: [PatternInfo; 5] = [
    info("D-A", Development, "List of points", "Develop the idea as a short list."),
    info("D-B", Development, "Story arc", "Walk through a small narrative with a turn."),
    info("D-C", Development, "Problem-solution", "Name a pain point, then resolve it."),
    info("D-D", Development, "Comparison", "Contrast two options, eras, or approaches."),
    info("D-E", Development, "Step-by-step", "Explain a process in ordered steps."),
];

static CLOSING: [PatternInfo; 5] = [
    info("C-A", Closing, "Call to action", "End by asking the reader to do something."),
    info("C-B", Closing, "Open question", "Close with a question that invites replies."),
    info("C-C", Closing, "Punchline", "Finish on a short, memorable line."),
    info("C-D", Closing, "Summary takeaway", "Restate the single key lesson."),
    info("C-E", Closing, "Teaser", "Hint at what comes next."),
];

/// Every pattern of `family`, in catalog order. Never empty.
pub fn catalog(family: PatternFamily) -> &'static [PatternInfo] {
    match family {
        Opening => &OPENING,
        Development => &DEVELOPMENT,
        Closing => &CLOSING,
    }
}

/// Metadata for a code, if it is in the catalog.
pub fn lookup(code: &PatternCode) -> Option<&'static PatternInfo> {
    let family = code.family()?;
    catalog(family).iter().find(|p| p.code == code.as_str())
}

/// Display name for a code, or the code itself when it is not catalogued.
pub fn display_name(code: &PatternCode) -> String {
    match lookup(code) {
        Some(info) => format!("{} ({})", info.code, info.name),
        None => code.to_string(),
    }
}
