use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::AdvisorySuggestion;

/// Advisory response cache. Non-authoritative: entries self-expire by
/// timestamp comparison at read time, a set racing an expiring read resolves
/// as last write wins, and a cache failure is never fatal to the request.
#[async_trait]
pub trait AdvisoryCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<AdvisorySuggestion>>;
    async fn set(&self, key: &str, suggestions: &[AdvisorySuggestion]);
}

/// Process-local cache for single-instance deployments.
pub struct MemoryAdvisoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (DateTime<Utc>, Vec<AdvisorySuggestion>)>>,
}

impl MemoryAdvisoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AdvisoryCache for MemoryAdvisoryCache {
    async fn get(&self, key: &str) -> Option<Vec<AdvisorySuggestion>> {
        let entries = self.entries.read().await;
        let (expires_at, suggestions) = entries.get(key)?;
        if *expires_at <= Utc::now() {
            // Expired entries are left for the next set to overwrite.
            return None;
        }
        Some(suggestions.clone())
    }

    async fn set(&self, key: &str, suggestions: &[AdvisorySuggestion]) {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        self.entries
            .write()
            .await
            .insert(key.to_string(), (expires_at, suggestions.to_vec()));
    }
}

/// Shared cache for multi-instance deployments, keyed in redis with a TTL so
/// every instance sees the same advisory content.
pub struct RedisAdvisoryCache {
    client: redis::Client,
    ttl: Duration,
}

impl RedisAdvisoryCache {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    fn redis_key(key: &str) -> String {
        format!("advisory:{key}")
    }
}

#[async_trait]
impl AdvisoryCache for RedisAdvisoryCache {
    async fn get(&self, key: &str) -> Option<Vec<AdvisorySuggestion>> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("advisory cache: failed to get redis conn: {}", e);
                return None;
            }
        };
        let raw: Option<String> = match conn.get(Self::redis_key(key)).await {
            Ok(v) => v,
            Err(e) => {
                warn!("advisory cache read failed: {}", e);
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(suggestions) => Some(suggestions),
            Err(e) => {
                warn!("advisory cache entry malformed, ignoring: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, suggestions: &[AdvisorySuggestion]) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("advisory cache: failed to get redis conn: {}", e);
                return;
            }
        };
        let payload = match serde_json::to_string(suggestions) {
            Ok(p) => p,
            Err(e) => {
                warn!("advisory cache encode failed: {}", e);
                return;
            }
        };
        let result: redis::RedisResult<()> = conn
            .set_ex(Self::redis_key(key), payload, self.ttl.as_secs())
            .await;
        if let Err(e) = result {
            warn!("advisory cache write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SuggestionCategory, SuggestionPriority};
    use uuid::Uuid;

    fn suggestion() -> AdvisorySuggestion {
        AdvisorySuggestion {
            id: Uuid::new_v4(),
            category: SuggestionCategory::Safety,
            title: "Keep your distance".to_string(),
            message: "Do not approach the animal".to_string(),
            confidence: 0.9,
            priority: SuggestionPriority::High,
            action: None,
        }
    }

    #[tokio::test]
    async fn memory_cache_returns_entry_within_ttl() {
        let cache = MemoryAdvisoryCache::new(Duration::from_secs(300));
        cache.set("k1", &[suggestion()]).await;
        assert_eq!(cache.get("k1").await.unwrap().len(), 1);
        assert!(cache.get("k2").await.is_none());
    }

    #[tokio::test]
    async fn memory_cache_expires_by_timestamp_comparison() {
        let cache = MemoryAdvisoryCache::new(Duration::from_secs(0));
        cache.set("k1", &[suggestion()]).await;
        assert!(cache.get("k1").await.is_none());
    }

    #[tokio::test]
    async fn later_set_wins() {
        let cache = MemoryAdvisoryCache::new(Duration::from_secs(300));
        cache.set("k1", &[suggestion()]).await;
        cache.set("k1", &[suggestion(), suggestion()]).await;
        assert_eq!(cache.get("k1").await.unwrap().len(), 2);
    }
}
