use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// Default time-to-live for cached responses.
/// 5 minutes keeps the task board snappy without letting cross-device edits
/// go unseen for long.
const DEFAULT_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(payload: Value, ttl: Duration) -> Self {
        Self {
            payload,
            cached_at: Utc::now(),
            ttl,
        }
    }

    /// An entry is served iff `now - cached_at < ttl`.
    fn is_fresh(&self) -> bool {
        Utc::now() - self.cached_at < self.ttl
    }
}

/// In-memory response cache keyed by `(user, endpoint)`.
///
/// Payloads are stored as opaque JSON; the cache never interprets them.
/// Invalidation is coarse: any mutating task operation wipes every entry
/// belonging to that user, and `logout` wipes everything.
///
/// Clone is cheap - the entry map is shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

fn cache_key(user_id: &str, endpoint: &str) -> String {
    format!("{}:{}", user_id, endpoint)
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a fresh entry, removing it if its TTL has elapsed.
    pub async fn get(&self, user_id: &str, endpoint: &str) -> Option<Value> {
        let key = cache_key(user_id, endpoint);

        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;

        if !entry.is_fresh() {
            drop(entries);
            let mut entries = self.entries.write().await;
            entries.remove(&key);
            debug!(key = %key, "evicted expired cache entry");
            return None;
        }

        Some(entry.payload.clone())
    }

    /// Store a payload with the default TTL.
    pub async fn insert(&self, user_id: &str, endpoint: &str, payload: Value) {
        self.insert_with_ttl(user_id, endpoint, payload, Duration::seconds(DEFAULT_TTL_SECS))
            .await;
    }

    pub async fn insert_with_ttl(
        &self,
        user_id: &str,
        endpoint: &str,
        payload: Value,
        ttl: Duration,
    ) {
        let key = cache_key(user_id, endpoint);
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry::new(payload, ttl));
    }

    /// Remove every entry belonging to `user_id`.
    pub async fn invalidate_user(&self, user_id: &str) {
        let prefix = format!("{}:", user_id);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        debug!(user_id, removed = before - entries.len(), "invalidated user cache");
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Rewind an entry's creation time, for expiry tests.
    #[cfg(test)]
    async fn backdate(&self, user_id: &str, endpoint: &str, age: Duration) {
        let key = cache_key(user_id, endpoint);
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&key) {
            entry.cached_at = Utc::now() - age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_fresh_entry() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/api/u1/tasks", json!([{"id": 1}])).await;

        assert_eq!(
            cache.get("u1", "/api/u1/tasks").await,
            Some(json!([{"id": 1}]))
        );
    }

    #[tokio::test]
    async fn test_get_misses_other_user_and_endpoint() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/api/u1/tasks", json!([])).await;

        assert_eq!(cache.get("u2", "/api/u1/tasks").await, None);
        assert_eq!(cache.get("u1", "/api/u1/tasks/3").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/api/u1/tasks", json!([])).await;
        cache
            .backdate("u1", "/api/u1/tasks", Duration::seconds(DEFAULT_TTL_SECS + 1))
            .await;

        assert_eq!(cache.get("u1", "/api/u1/tasks").await, None);
        // The expired entry must be gone, not just skipped.
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entry_just_inside_ttl_is_served() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/api/u1/tasks", json!(1)).await;
        cache
            .backdate("u1", "/api/u1/tasks", Duration::seconds(DEFAULT_TTL_SECS - 5))
            .await;

        assert_eq!(cache.get("u1", "/api/u1/tasks").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_invalidate_user_removes_only_that_prefix() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/api/u1/tasks", json!(1)).await;
        cache.insert("u1", "/api/u1/tasks/9", json!(2)).await;
        cache.insert("u2", "/api/u2/tasks", json!(3)).await;

        cache.invalidate_user("u1").await;

        assert_eq!(cache.get("u1", "/api/u1/tasks").await, None);
        assert_eq!(cache.get("u1", "/api/u1/tasks/9").await, None);
        assert_eq!(cache.get("u2", "/api/u2/tasks").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_invalidate_user_does_not_match_prefix_of_longer_id() {
        // "u1" must not wipe "u10" entries.
        let cache = ResponseCache::new();
        cache.insert("u10", "/api/u10/tasks", json!(1)).await;

        cache.invalidate_user("u1").await;

        assert_eq!(cache.get("u10", "/api/u10/tasks").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResponseCache::new();
        cache.insert("u1", "/a", json!(1)).await;
        cache.insert("u2", "/b", json!(2)).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
    }
}
