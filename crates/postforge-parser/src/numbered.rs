// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numbered and labelled list segmentation.
//!
//! A marker line starts a new segment; following lines belong to it until the
//! next marker. Text before the first marker is treated as preamble and
//! dropped.

use std::sync::LazyLock;

use postforge_core::Candidate;
use regex::Regex;

use crate::ParseStrategy;

/// `1.` or `2)` at line start, optionally bolded. A digit right after the dot
/// (`1.5 million`) is not a marker.
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*)?(\d{1,2})[.)](?:\*\*)?(?:\s+(.*))?$")
        .expect("numbered marker pattern is valid")
});

/// `Pattern 1:`, `Option 2:`, `Variant 3 -`, `パターン１：` and similar.
static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*)?(?:\*\*)?((?:pattern|option|variant|draft|version)\s*(?:\d+|[A-E])|パターン\s*[0-9０-９A-EＡ-Ｅ]+|案\s*[0-9０-９]+)(?:\*\*)?\s*[:：\-–]\s*(?:\*\*)?\s*(.*)$",
    )
    .expect("labelled marker pattern is valid")
});

/// Splits text on numbered (`1.`, `1)`) or labelled (`Pattern 1:`) markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberedList;

struct Segment {
    label: Option<String>,
    lines: Vec<String>,
}

impl Segment {
    fn into_candidate(self) -> Option<Candidate> {
        let text = self.lines.join("\n").trim().to_string();
        (!text.is_empty()).then_some(Candidate {
            text,
            label: self.label,
        })
    }
}

fn marker(line: &str) -> Option<Segment> {
    if let Some(caps) = LABELLED.captures(line) {
        return Some(Segment {
            label: caps.get(1).map(|m| m.as_str().trim().to_string()),
            lines: caps
                .get(2)
                .map(|m| vec![m.as_str().to_string()])
                .unwrap_or_default(),
        });
    }
    NUMBERED.captures(line).map(|caps| Segment {
        label: None,
        lines: caps
            .get(2)
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default(),
    })
}

impl ParseStrategy for NumberedList {
    fn name(&self) -> &'static str {
        "numbered_list"
    }

    fn parse(&self, raw: &str) -> Option<Vec<Candidate>> {
        let mut segments: Vec<Segment> = Vec::new();
        for line in raw.lines() {
            if let Some(segment) = marker(line) {
                segments.push(segment);
            } else if let Some(current) = segments.last_mut() {
                current.lines.push(line.to_string());
            }
        }

        let candidates: Vec<Candidate> = segments
            .into_iter()
            .filter_map(Segment::into_candidate)
            .collect();
        (!candidates.is_empty()).then_some(candidates)
    }
}
