// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured JSON output: an object carrying a `variants` array.
//!
//! Models wrap JSON in markdown fences or surround it with prose, so several
//! slices of the input are tried before giving up.

use postforge_core::Candidate;
use serde_json::Value;

use crate::ParseStrategy;

/// Parses `{"variants": [...]}` objects.
///
/// Each element may be a string or an object with `body` (falling back to
/// `text`) and an optional `label` or `pattern`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVariants;

impl ParseStrategy for JsonVariants {
    fn name(&self) -> &'static str {
        "json_variants"
    }

    fn parse(&self, raw: &str) -> Option<Vec<Candidate>> {
        json_slices(raw)
            .into_iter()
            .filter_map(|slice| serde_json::from_str::<Value>(slice).ok())
            .find_map(|value| variants(&value))
    }
}

fn variants(value: &Value) -> Option<Vec<Candidate>> {
    let items = value.get("variants")?.as_array()?;
    let candidates: Vec<Candidate> = items.iter().filter_map(variant).collect();
    (!candidates.is_empty()).then_some(candidates)
}

fn variant(item: &Value) -> Option<Candidate> {
    if let Some(text) = item.as_str() {
        let text = text.trim();
        return (!text.is_empty()).then(|| Candidate::new(text));
    }

    let text = ["body", "text"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|t| !t.is_empty())?;

    let label = ["label", "pattern"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Some(Candidate {
        text: text.to_string(),
        label,
    })
}

/// Slices of `raw` that may hold the JSON object, most likely first.
fn json_slices(raw: &str) -> Vec<&str> {
    let mut slices = vec![raw.trim()];
    slices.extend(fenced_blocks(raw));
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}'))
        && start < end
    {
        slices.push(&raw[start..=end]);
    }
    if let Some(balanced) = balanced_object(raw) {
        slices.push(balanced);
    }
    slices
}

/// Contents of every ``` fenced block, with any language tag dropped.
fn fenced_blocks(raw: &str) -> Vec<&str> {
    const FENCE: &str = "```";
    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        // Skip the info string (e.g. `json`) up to the end of the line.
        let body_start = after_open.find('\n').map_or(0, |i| i + 1);
        let body = &after_open[body_start..];
        let Some(close) = body.find(FENCE) else {
            break;
        };
        blocks.push(body[..close].trim());
        rest = &body[close + FENCE.len()..];
    }
    blocks
}

/// The first brace-balanced `{...}` span, ignoring braces inside strings.
fn balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn bare_object() {
        let raw = r#"{"variants": [{"body": "one", "label": "O-A"}, {"body": "two"}]}"#;
        let parsed = JsonVariants.parse(raw).unwrap();
        assert_eq!(texts(&parsed), ["one", "two"]);
        assert_eq!(parsed[0].label.as_deref(), Some("O-A"));
        assert_eq!(parsed[1].label, None);
    }

    #[test]
    fn fenced_object_with_language_tag() {
        let raw = "Here you go:\n```json\n{\"variants\": [{\"text\": \"fenced\"}]}\n```\nEnjoy!";
        let parsed = JsonVariants.parse(raw).unwrap();
        assert_eq!(texts(&parsed), ["fenced"]);
    }

    #[test]
    fn object_inside_prose() {
        let raw = r#"Sure! {"variants": ["plain string", {"body": "obj", "pattern": 2}]} Hope this helps."#;
        let parsed = JsonVariants.parse(raw).unwrap();
        assert_eq!(texts(&parsed), ["plain string", "obj"]);
        assert_eq!(parsed[1].label.as_deref(), Some("2"));
    }

    #[test]
    fn body_preferred_over_text_and_blank_body_falls_back() {
        let raw = r#"{"variants": [{"body": "b", "text": "t"}, {"body": "  ", "text": "t2"}]}"#;
        let parsed = JsonVariants.parse(raw).unwrap();
        assert_eq!(texts(&parsed), ["b", "t2"]);
    }

    #[test]
    fn balanced_span_skips_trailing_braces() {
        let raw = r#"{"variants": [{"body": "has } brace"}]} and then {oops}"#;
        let parsed = JsonVariants.parse(raw).unwrap();
        assert_eq!(texts(&parsed), ["has } brace"]);
    }

    #[test]
    fn rejects_objects_without_usable_variants() {
        assert_eq!(JsonVariants.parse(r#"{"drafts": ["x"]}"#), None);
        assert_eq!(JsonVariants.parse(r#"{"variants": []}"#), None);
        assert_eq!(JsonVariants.parse(r#"{"variants": [{"label": "x"}]}"#), None);
        assert_eq!(JsonVariants.parse("{not json"), None);
        assert_eq!(JsonVariants.parse("no braces at all"), None);
    }

    #[test]
    fn unterminated_fence_is_ignored() {
        assert!(fenced_blocks("```json\n{\"variants\": []}").is_empty());
    }
}
