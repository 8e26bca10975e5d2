// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the generation, pattern, and batch subsystems.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Hard cap on candidates returned from one generation call.
pub const MAX_CANDIDATES: usize = 3;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    BatchVendor,
    Storage,
}

// --- Pattern types ---

/// The three disjoint families of stylistic pattern codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    Opening,
    Development,
    Closing,
}

/// Opaque tag identifying one stylistic choice, e.g. `O-A` or `D-C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternCode(pub String);

impl PatternCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Family implied by the code prefix (`O-`, `D-`, `C-`).
    pub fn family(&self) -> Option<PatternFamily> {
        match self.0.split_once('-')?.0 {
            "O" => Some(PatternFamily::Opening),
            "D" => Some(PatternFamily::Development),
            "C" => Some(PatternFamily::Closing),
            _ => None,
        }
    }
}

impl fmt::Display for PatternCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatternCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// One previously generated post's stylistic fingerprint, as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationHistoryEntry {
    pub opening: Option<PatternCode>,
    pub development: Option<PatternCode>,
    pub closing: Option<PatternCode>,
    #[serde(default)]
    pub expressions: Vec<String>,
}

/// The patterns and expressions a successful generation actually used.
///
/// Written append-only by the caller after generation succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternUsage {
    pub opening: Option<PatternCode>,
    pub development: Option<PatternCode>,
    pub closing: Option<PatternCode>,
    #[serde(default)]
    pub expressions: Vec<String>,
}

impl From<PatternUsage> for GenerationHistoryEntry {
    fn from(usage: PatternUsage) -> Self {
        Self {
            opening: usage.opening,
            development: usage.development,
            closing: usage.closing,
            expressions: usage.expressions,
        }
    }
}

// --- Generation types ---

/// The closed set of generation tasks.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    TweetGeneration,
    ReplyGeneration,
    QuoteRtGeneration,
    CompetitorAnalysis,
    PerformanceSummary,
}

impl TaskType {
    /// Maps a caller-supplied hint to a task type.
    ///
    /// Unknown, empty, and absent hints all mean `tweet_generation`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(|h| h.trim().to_ascii_lowercase()).as_deref() {
            Some("quote") => Self::QuoteRtGeneration,
            Some("reply") => Self::ReplyGeneration,
            Some("analysis") => Self::CompetitorAnalysis,
            Some("summary") => Self::PerformanceSummary,
            _ => Self::TweetGeneration,
        }
    }

    /// Analytical tasks are the only ones allowed to use extended reasoning.
    pub fn is_analytical(self) -> bool {
        matches!(self, Self::CompetitorAnalysis | Self::PerformanceSummary)
    }
}

/// A single synchronous or batched generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    #[serde(default)]
    pub task_type: TaskType,
}

/// One generated draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: None,
        }
    }

    pub fn labeled(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: Some(label.into()),
        }
    }
}

/// Token usage statistics reported by a vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A raw completion returned by a provider adapter, before candidate parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    pub text: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

/// A usage record handed to the cost collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub provider: String,
    pub model: String,
    pub task_type: TaskType,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub is_batch: bool,
    pub batch_id: Option<String>,
}

impl UsageEvent {
    /// Builds a synchronous usage event.
    pub fn sync(provider: &str, model: &str, task_type: TaskType, usage: TokenUsage) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            task_type,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            is_batch: false,
            batch_id: None,
        }
    }

    /// Builds a usage event attributed to a batch job.
    pub fn batch(
        provider: &str,
        model: &str,
        task_type: TaskType,
        usage: TokenUsage,
        batch_id: &str,
    ) -> Self {
        Self {
            is_batch: true,
            batch_id: Some(batch_id.to_string()),
            ..Self::sync(provider, model, task_type, usage)
        }
    }
}

/// Result of the pre-flight budget check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub should_pause: bool,
    pub daily_spent_usd: f64,
    pub monthly_spent_usd: f64,
    pub reason: Option<String>,
}

impl BudgetStatus {
    /// A status that never pauses, for deployments without a budget.
    pub fn unlimited() -> Self {
        Self::default()
    }
}

// --- Batch types ---

/// Lifecycle status of a batch job. Completed and Failed are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a job may move from `self` to `next`.
    pub fn can_transition_to(self, next: BatchStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Processing | Self::Failed) => true,
            (Self::Processing, Self::Completed | Self::Failed) => true,
            _ => false,
        }
    }
}

/// Per-request metadata kept with a batch job, keyed by correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub custom_id: String,
    pub task_type: TaskType,
    pub model: String,
}

/// One request as sent to a batch vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemRequest {
    pub custom_id: String,
    pub request: GenerationRequest,
}

/// A draft candidate materialized from a batch result, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDraft {
    pub custom_id: String,
    pub task_type: TaskType,
    pub text: String,
    pub label: Option<String>,
}

/// A vendor-side asynchronous bulk generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    pub batch_id: String,
    pub provider: String,
    pub status: BatchStatus,
    pub task_type: TaskType,
    pub request_count: u32,
    pub completed_count: u32,
    pub items: Vec<BatchItem>,
    pub results: Vec<BatchDraft>,
    pub error: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl BatchJob {
    /// Looks up the request metadata for a correlation id.
    pub fn item(&self, custom_id: &str) -> Option<&BatchItem> {
        self.items.iter().find(|i| i.custom_id == custom_id)
    }
}

/// Vendor acknowledgement of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSubmission {
    pub batch_id: String,
}

/// Coarse vendor-side batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum VendorBatchStatus {
    InProgress,
    Ended,
    Errored,
}

/// Outcome of one line of a batch results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRecordOutcome {
    Succeeded {
        model: String,
        text: String,
        usage: TokenUsage,
    },
    Failed {
        reason: String,
    },
}

/// One record of a batch results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResultRecord {
    pub custom_id: String,
    pub outcome: BatchRecordOutcome,
}

// --- Best-effort results ---

/// The result of an operation that degrades instead of failing.
///
/// `Degraded` still carries a usable value (usually empty) together with the
/// reason the full result was unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    Complete(T),
    Degraded { value: T, reason: String },
}

impl<T> BestEffort<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}
