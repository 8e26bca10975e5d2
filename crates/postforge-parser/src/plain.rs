// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use postforge_core::Candidate;

use crate::ParseStrategy;

/// Last resort: the whole trimmed input is one candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl ParseStrategy for PlainText {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn parse(&self, raw: &str) -> Option<Vec<Candidate>> {
        let text = raw.trim();
        (!text.is_empty()).then(|| vec![Candidate::new(text)])
    }
}
