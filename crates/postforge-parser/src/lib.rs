// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate parsing for raw model output.
//!
//! Vendor output varies by model and prompt, so parsing is a chain of
//! [`ParseStrategy`] implementations tried in order; the first one that yields
//! at least one candidate wins. Parsing never fails: any non-blank input
//! produces at least one candidate via [`PlainText`], and the result is always
//! capped at [`MAX_CANDIDATES`].

pub mod json;
pub mod numbered;
pub mod plain;

use std::sync::LazyLock;

use postforge_core::{Candidate, MAX_CANDIDATES};
use tracing::trace;

pub use json::JsonVariants;
pub use numbered::NumberedList;
pub use plain::PlainText;

/// One way of turning raw text into candidates.
pub trait ParseStrategy: Send + Sync {
    /// Short name used in trace logs.
    fn name(&self) -> &'static str;

    /// Returns `None` when this strategy does not recognize the input.
    fn parse(&self, raw: &str) -> Option<Vec<Candidate>>;
}

/// Ordered chain of parse strategies.
pub struct CandidateParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl CandidateParser {
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// JSON variants, then numbered/labelled lists, then plain text.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(JsonVariants),
            Box::new(NumberedList),
            Box::new(PlainText),
        ])
    }

    /// Numbered/labelled segmentation with a plain-text fallback.
    ///
    /// Used to split one batch result text into several drafts.
    pub fn segmenting() -> Self {
        Self::new(vec![Box::new(NumberedList), Box::new(PlainText)])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Parses `raw` into at most [`MAX_CANDIDATES`] candidates.
    pub fn parse(&self, raw: &str) -> Vec<Candidate> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        for strategy in &self.strategies {
            let Some(mut candidates) = strategy.parse(raw) else {
                continue;
            };
            candidates.retain(|c| !c.text.trim().is_empty());
            if candidates.is_empty() {
                continue;
            }
            candidates.truncate(MAX_CANDIDATES);
            trace!(
                strategy = strategy.name(),
                count = candidates.len(),
                "parsed candidates"
            );
            return candidates;
        }
        Vec::new()
    }
}

impl Default for CandidateParser {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD: LazyLock<CandidateParser> = LazyLock::new(CandidateParser::standard);

/// Parses raw model output with the standard strategy chain.
pub fn parse_candidates(raw: &str) -> Vec<Candidate> {
    STANDARD.parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    impl ParseStrategy for Never {
        fn name(&self) -> &'static str {
            "never"
        }

        fn parse(&self, _raw: &str) -> Option<Vec<Candidate>> {
            None
        }
    }

    struct Blank;

    impl ParseStrategy for Blank {
        fn name(&self) -> &'static str {
            "blank"
        }

        fn parse(&self, _raw: &str) -> Option<Vec<Candidate>> {
            Some(vec![Candidate::new("  ")])
        }
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates(" \n\t ").is_empty());
    }

    #[test]
    fn json_wins_over_numbered_lines_inside_it() {
        let raw = r#"{"variants": [{"body": "1. first"}, {"body": "2. second"}]}"#;
        let parsed = parse_candidates(raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "1. first");
    }

    #[test]
    fn numbered_list_used_when_no_json() {
        let parsed = parse_candidates("1. Alpha\n2. Beta\n3. Gamma\n4. Delta");
        let texts: Vec<_> = parsed.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn prose_falls_back_to_single_candidate() {
        let parsed = parse_candidates("  Shipping beats polishing.  ");
        assert_eq!(parsed, vec![Candidate::new("Shipping beats polishing.")]);
    }

    #[test]
    fn strategies_yielding_only_blank_text_are_skipped() {
        let parser = CandidateParser::new(vec![
            Box::new(Never),
            Box::new(Blank),
            Box::new(PlainText),
        ]);
        assert_eq!(parser.parse("hello"), vec![Candidate::new("hello")]);
    }

    #[test]
    fn chain_without_fallback_can_come_up_empty() {
        let parser = CandidateParser::new(vec![Box::new(Never)]);
        assert!(parser.parse("hello").is_empty());
    }

    #[test]
    fn segmenting_chain_skips_json() {
        let parser = CandidateParser::segmenting();
        assert_eq!(parser.strategy_names(), ["numbered_list", "plain_text"]);
        let raw = r#"{"variants": ["a", "b"]}"#;
        assert_eq!(parser.parse(raw), vec![Candidate::new(raw)]);
    }
}
