// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages and Message Batches API request/response types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ApiMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate, thinking included.
    pub max_tokens: u32,

    /// Extended thinking, only sent when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
}

/// A single message in the Anthropic conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Extended thinking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThinkingConfig {
    /// Always "enabled" when present.
    #[serde(rename = "type")]
    pub type_: String,
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            type_: "enabled".to_string(),
            budget_tokens,
        }
    }
}

// --- Response types ---

/// A full response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    /// Always "message".
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub role: String,
    pub content: Vec<ResponseContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: ApiUsage,
}

impl MessageResponse {
    /// Concatenated text blocks; thinking blocks are dropped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Reasoning emitted when extended thinking is enabled.
    #[serde(rename = "thinking")]
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: Option<String>,
    },
    #[serde(rename = "redacted_thinking")]
    RedactedThinking { data: String },
    /// Block types this adapter does not use (tool use etc.).
    #[serde(other)]
    Other,
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(default)]
    pub cache_read_input_tokens: u32,
    #[serde(default)]
    pub cache_creation_input_tokens: u32,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier, e.g. `rate_limit_error`.
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}

// --- Message Batches ---

/// Body of `POST /v1/messages/batches`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBatchRequest {
    pub requests: Vec<BatchRequestItem>,
}

/// One request inside a batch, tagged with its correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequestItem {
    pub custom_id: String,
    pub params: MessageRequest,
}

/// A Message Batch object.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBatch {
    pub id: String,
    /// `in_progress`, `canceling`, or `ended`.
    pub processing_status: String,
    #[serde(default)]
    pub request_counts: BatchRequestCounts,
    #[serde(default)]
    pub results_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
}

/// Per-outcome request counts of a batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequestCounts {
    #[serde(default)]
    pub processing: u32,
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub errored: u32,
    #[serde(default)]
    pub canceled: u32,
    #[serde(default)]
    pub expired: u32,
}

/// One line of a batch results JSONL file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResultLine {
    pub custom_id: String,
    pub result: BatchResultBody,
}

/// Outcome of one batch request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchResultBody {
    Succeeded { message: MessageResponse },
    Errored { error: serde_json::Value },
    Canceled,
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request_without_thinking() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage::user("Hello")],
            system: Some("You write tweets.".into()),
            max_tokens: 1024,
            thinking: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["system"], "You write tweets.");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert!(json.get("thinking").is_none());
    }

    #[test]
    fn serialize_request_with_thinking() {
        let req = MessageRequest {
            model: "claude-opus-4-20250514".into(),
            messages: vec![ApiMessage::user("Analyze")],
            system: None,
            max_tokens: 5120,
            thinking: Some(ThinkingConfig::enabled(4096)),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["thinking"]["type"], "enabled");
        assert_eq!(json["thinking"]["budget_tokens"], 4096);
        assert!(json.get("system").is_none());
    }

    #[test]
    fn response_text_skips_thinking_and_unknown_blocks() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-opus-4-20250514",
            "content": [
                {"type": "thinking", "thinking": "let me reason", "signature": "sig"},
                {"type": "redacted_thinking", "data": "xyz"},
                {"type": "text", "text": "Answer "},
                {"type": "tool_use", "id": "t", "name": "n", "input": {}},
                {"type": "text", "text": "here"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;
        let response: MessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "Answer here");
        assert_eq!(response.usage.cache_read_input_tokens, 0);
    }

    #[test]
    fn deserialize_batch_object() {
        let body = r#"{
            "id": "msgbatch_01",
            "type": "message_batch",
            "processing_status": "in_progress",
            "request_counts": {"processing": 2, "succeeded": 0, "errored": 0, "canceled": 0, "expired": 0},
            "results_url": null,
            "created_at": "2026-03-01T10:00:00Z"
        }"#;
        let batch: MessageBatch = serde_json::from_str(body).unwrap();
        assert_eq!(batch.id, "msgbatch_01");
        assert_eq!(batch.request_counts.processing, 2);
        assert!(batch.results_url.is_none());
    }

    #[test]
    fn deserialize_result_lines() {
        let ok = r#"{"custom_id":"a","result":{"type":"succeeded","message":{"id":"m","type":"message","role":"assistant","model":"claude-sonnet-4-20250514","content":[{"type":"text","text":"hi"}],"stop_reason":"end_turn","usage":{"input_tokens":1,"output_tokens":2}}}}"#;
        let line: BatchResultLine = serde_json::from_str(ok).unwrap();
        assert!(matches!(line.result, BatchResultBody::Succeeded { .. }));

        let err = r#"{"custom_id":"b","result":{"type":"errored","error":{"type":"error","error":{"type":"invalid_request_error","message":"bad"}}}}"#;
        let line: BatchResultLine = serde_json::from_str(err).unwrap();
        assert!(matches!(line.result, BatchResultBody::Errored { .. }));

        let expired = r#"{"custom_id":"c","result":{"type":"expired"}}"#;
        let line: BatchResultLine = serde_json::from_str(expired).unwrap();
        assert!(matches!(line.result, BatchResultBody::Expired));
    }
}
