//! In-memory cache implementation using the moka crate.

use std::future::ready;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use filerepo_core::config::cache::MemoryCacheConfig;
use filerepo_core::result::AppResult;
use filerepo_core::traits::cache::CacheProvider;

/// A cached string together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Per-entry expiry: every write restarts the entry's own TTL.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache provider using moka.
///
/// Plain values live in a size-bounded cache. Conditional writes
/// (`set_nx`, `compare_and_delete`) go to a separate cache with no capacity
/// bound, so a held key leaves only by its TTL or an explicit delete and
/// never to eviction pressure. Both use moka's per-key compute, which makes
/// them atomic within this process.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// Size-bounded cache for plain values.
    cache: Cache<String, Entry>,
    /// Unbounded cache for conditionally written keys.
    guarded: Cache<String, Entry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        let guarded = Cache::builder().expire_after(PerEntryTtl).build();

        Self { cache, guarded }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.cache.get(key).await {
            return Ok(Some(entry.value));
        }
        Ok(self.guarded.get(key).await.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.guarded.remove(key).await;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let candidate = Entry {
            value: value.to_string(),
            ttl,
        };
        let result = self
            .guarded
            .entry(key.to_string())
            .and_compute_with(|current| {
                ready(match current {
                    Some(_) => Op::Nop,
                    None => Op::Put(candidate),
                })
            })
            .await;

        let acquired = matches!(result, CompResult::Inserted(_));
        debug!(key = %key, acquired, "Conditional set");
        Ok(acquired)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let result = self
            .guarded
            .entry(key.to_string())
            .and_compute_with(|current| {
                ready(match current {
                    Some(entry) if entry.value().value == expected => Op::Remove,
                    _ => Op::Nop,
                })
            })
            .await;

        Ok(matches!(result, CompResult::Removed(_)))
    }
}
