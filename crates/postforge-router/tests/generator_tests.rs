// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generator and cached engagement lookup against mocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use postforge_core::{
    BestEffort, CostCollaborator, EngagementLookup, GenerationRequest, PostforgeError, TaskType,
    UsageEvent,
};
use postforge_router::{
    CachedEngagementLookup, GenerationOutcome, Generator, ProviderKind, ProviderRegistry,
};
use postforge_test_utils::{MOCK_USAGE, MockProvider, RecordingCostCollaborator};

fn request(task_type: TaskType) -> GenerationRequest {
    GenerationRequest {
        prompt: "Write three takes on launch day".into(),
        system_prompt: None,
        model: "claude-sonnet-4-20250514".into(),
        max_tokens: 512,
        task_type,
    }
}

fn generator(
    provider: Arc<MockProvider>,
    cost: Arc<RecordingCostCollaborator>,
) -> Generator {
    let mut registry = ProviderRegistry::new();
    registry.register(ProviderKind::Anthropic, provider);
    Generator::new(Arc::new(registry), cost)
}

#[tokio::test]
async fn generation_parses_candidates_and_logs_usage() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    provider
        .add_response("1. Ship it today\n2. We're live\n3. Doors open\n4. One more")
        .await;
    let cost = Arc::new(RecordingCostCollaborator::new());

    let outcome = generator(provider.clone(), cost.clone())
        .generate("anthropic", &request(TaskType::ReplyGeneration))
        .await
        .unwrap();

    let generation = outcome.generation().unwrap();
    assert_eq!(generation.provider, "anthropic");
    let texts: Vec<_> = generation.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["Ship it today", "We're live", "Doors open"]);
    assert_eq!(generation.usage_log, BestEffort::Complete(()));

    let events = cost.events().await;
    assert_eq!(
        events,
        vec![UsageEvent::sync(
            "anthropic",
            "claude-sonnet-4-20250514",
            TaskType::ReplyGeneration,
            MOCK_USAGE
        )]
    );
}

#[tokio::test]
async fn paused_budget_declines_without_vendor_call() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    let cost = Arc::new(RecordingCostCollaborator::paused("daily budget exhausted"));

    let outcome = generator(provider.clone(), cost.clone())
        .generate("anthropic", &request(TaskType::TweetGeneration))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        GenerationOutcome::Declined {
            reason: "daily budget exhausted".into()
        }
    );
    assert_eq!(provider.calls(), 0);
    assert!(cost.events().await.is_empty());
}

#[tokio::test]
async fn unknown_provider_fails_before_budget_or_vendor() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    let cost = Arc::new(RecordingCostCollaborator::new());

    let err = generator(provider.clone(), cost.clone())
        .generate("cohere", &request(TaskType::TweetGeneration))
        .await
        .unwrap_err();

    assert!(matches!(err, PostforgeError::UnknownProvider { ref key } if key == "cohere"));
    assert_eq!(cost.budget_checks(), 0);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn registered_kind_without_adapter_is_config_error() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    let cost = Arc::new(RecordingCostCollaborator::new());

    let err = generator(provider, cost)
        .generate("openai", &request(TaskType::TweetGeneration))
        .await
        .unwrap_err();
    assert!(matches!(err, PostforgeError::Config(_)));
}

#[tokio::test]
async fn vendor_error_propagates_and_logs_nothing() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    provider.add_error(500).await;
    let cost = Arc::new(RecordingCostCollaborator::new());

    let err = generator(provider, cost.clone())
        .generate("anthropic", &request(TaskType::TweetGeneration))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(cost.events().await.is_empty());
}

#[tokio::test]
async fn failed_budget_check_fails_open() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    provider.add_response("Just one take").await;
    let cost = Arc::new(RecordingCostCollaborator::new());
    cost.fail_budget_checks();

    let outcome = generator(provider.clone(), cost)
        .generate("anthropic", &request(TaskType::TweetGeneration))
        .await
        .unwrap();
    assert!(!outcome.is_declined());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn usage_log_failure_is_degraded_not_fatal() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    provider.add_response("Only draft").await;
    let cost = Arc::new(RecordingCostCollaborator::new());
    cost.fail_usage_logging();

    let outcome = generator(provider, cost)
        .generate("anthropic", &request(TaskType::TweetGeneration))
        .await
        .unwrap();
    let generation = outcome.generation().unwrap();
    assert_eq!(generation.candidates.len(), 1);
    assert!(generation.usage_log.is_degraded());
    assert!(generation.usage_log.reason().unwrap().contains("usage_logs"));
}

#[tokio::test]
async fn empty_completion_yields_no_candidates() {
    let provider = Arc::new(MockProvider::named("anthropic"));
    provider.add_response("   ").await;
    let cost = Arc::new(RecordingCostCollaborator::new());

    let outcome = generator(provider, cost.clone())
        .generate("anthropic", &request(TaskType::TweetGeneration))
        .await
        .unwrap();
    assert!(outcome.generation().unwrap().candidates.is_empty());
    // Tokens were still spent.
    assert_eq!(cost.events().await.len(), 1);
}

struct CountingLookup {
    calls: AtomicUsize,
}

#[async_trait]
impl EngagementLookup for CountingLookup {
    async fn replied_or_quoted_ids(&self, account_id: &str) -> Result<Vec<String>, PostforgeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if account_id == "broken" {
            return Err(PostforgeError::Internal("lookup failed".into()));
        }
        Ok(vec![format!("{account_id}-post-{n}")])
    }
}

#[tokio::test(start_paused = true)]
async fn engagement_lookup_is_cached_until_ttl() {
    let inner = Arc::new(CountingLookup {
        calls: AtomicUsize::new(0),
    });
    let cost: Arc<dyn CostCollaborator> = Arc::new(RecordingCostCollaborator::new());
    let lookup = CachedEngagementLookup::new(inner.clone(), cost, Duration::from_secs(300));

    let first = lookup.replied_or_quoted_ids("acct").await.unwrap();
    let second = lookup.replied_or_quoted_ids("acct").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

    lookup.replied_or_quoted_ids("other").await.unwrap();
    assert_eq!(lookup.cached_accounts(), 2);

    tokio::time::advance(Duration::from_secs(301)).await;
    let third = lookup.replied_or_quoted_ids("acct").await.unwrap();
    assert_ne!(first, third);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn engagement_lookup_errors_are_not_cached() {
    let inner = Arc::new(CountingLookup {
        calls: AtomicUsize::new(0),
    });
    let cost: Arc<dyn CostCollaborator> = Arc::new(RecordingCostCollaborator::new());
    let lookup = CachedEngagementLookup::new(inner.clone(), cost, Duration::from_secs(300));

    assert!(lookup.replied_or_quoted_ids("broken").await.is_err());
    assert!(lookup.replied_or_quoted_ids("broken").await.is_err());
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn paused_budget_returns_empty_engagement() {
    let inner = Arc::new(CountingLookup {
        calls: AtomicUsize::new(0),
    });
    let cost = Arc::new(RecordingCostCollaborator::paused("monthly cap"));
    let lookup = CachedEngagementLookup::new(inner.clone(), cost, Duration::from_secs(300));

    assert!(lookup.replied_or_quoted_ids("acct").await.unwrap().is_empty());
    assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(lookup.cached_accounts(), 0);
}
