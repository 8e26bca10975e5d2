// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived read-through cache.
//!
//! Entries expire by TTL only; there is no write-through invalidation.
//! Timestamps use `tokio::time::Instant` so a paused test clock drives expiry.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;

/// Concurrent map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a live entry, evicting it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let live = {
            let entry = self.entries.get(key)?;
            let (inserted, value) = entry.value();
            (inserted.elapsed() < self.ttl).then(|| value.clone())
        };
        if live.is_none() {
            trace!(?key, "cache entry expired");
            self.entries
                .remove_if(key, |_, (inserted, _)| inserted.elapsed() >= self.ttl);
        }
        live
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    /// Returns the cached value, or runs `fetch` and caches its success.
    ///
    /// Errors are passed through and never cached. Concurrent misses for the
    /// same key may each call `fetch`; the last one to finish wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            trace!(?key, "cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (inserted, _)| inserted.elapsed() < ttl);
    }
}
