//! Flag store with an in-memory read-through cache.
//!
//! Wraps any [`FlagManagement`] implementation and caches `find_by_key`
//! results in a `moka` cache with a TTL.
//!
//! # Caching Strategy
//!
//! - **Read-through**: check the cache first, query the store on a miss,
//!   populate the cache
//! - **Negative caching**: a missing key is cached as absent, so lookups of
//!   unknown keys do not hit the store on every evaluation
//! - **Write-through invalidation**: every mutation writes to the store, then
//!   removes the affected keys (old and new on a rename)
//! - **Write generation**: mutations bump a counter before invalidating. A
//!   lookup that overlaps a mutation drops the entry it just filled, so a
//!   value read before the write cannot outlive the invalidation
//! - **Bounded staleness**: writes made behind the service's back become
//!   visible after at most one TTL
//! - `find_all` always reads the store
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flagwise_core::FlagStore;
//! use flagwise_domain::CacheConfig;
//! use flagwise_infra::{CachedFlagService, InMemoryFlagRepository};
//!
//! # async fn example() {
//! let service =
//!     CachedFlagService::new(Arc::new(InMemoryFlagRepository::new()), &CacheConfig::default());
//!
//! let flag = service.find_by_key("new-checkout").await.unwrap_or(None);
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flagwise_core::{FlagManagement, FlagStore};
use flagwise_domain::{CacheConfig, Flag, FlagPatch, NewFlag, Result as DomainResult};
use moka::future::Cache;
use tracing::trace;

/// Flag store decorator with read-through caching.
pub struct CachedFlagService<S> {
    inner: Arc<S>,
    cache: Cache<String, Option<Flag>>,
    write_generation: AtomicU64,
}

impl<S: FlagManagement> CachedFlagService<S> {
    /// Wrap `inner` with a cache sized and timed by `config`.
    pub fn new(inner: Arc<S>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds.max(1)))
            .build();
        Self { inner, cache, write_generation: AtomicU64::new(0) }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    /// Drop every cached entry.
    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of cached keys, including cached misses.
    pub async fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    async fn invalidate(&self, key: &str) {
        self.write_generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(key).await;
    }
}

#[async_trait]
impl<S: FlagManagement> FlagStore for CachedFlagService<S> {
    async fn find_by_key(&self, key: &str) -> DomainResult<Option<Flag>> {
        if let Some(cached) = self.cache.get(key).await {
            trace!(flag_key = key, "flag cache hit");
            return Ok(cached);
        }

        let generation = self.write_generation.load(Ordering::SeqCst);
        let flag = self.inner.find_by_key(key).await?;
        self.cache.insert(key.to_string(), flag.clone()).await;

        // A mutation ran while the store was read; the entry may predate it
        if self.write_generation.load(Ordering::SeqCst) != generation {
            trace!(flag_key = key, "flag changed during lookup, dropping cache entry");
            self.cache.invalidate(key).await;
        }
        Ok(flag)
    }

    async fn find_all(&self) -> DomainResult<Vec<Flag>> {
        self.inner.find_all().await
    }
}

#[async_trait]
impl<S: FlagManagement> FlagManagement for CachedFlagService<S> {
    async fn create(&self, new_flag: NewFlag) -> DomainResult<Flag> {
        let flag = self.inner.create(new_flag).await?;
        // May hold a cached miss
        self.invalidate(&flag.key).await;
        Ok(flag)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Flag> {
        self.inner.find_by_id(id).await
    }

    async fn update(&self, id: &str, patch: FlagPatch) -> DomainResult<Flag> {
        let before = self.inner.find_by_id(id).await?;
        let updated = self.inner.update(id, patch).await?;

        self.invalidate(&before.key).await;
        if updated.key != before.key {
            self.invalidate(&updated.key).await;
        }
        Ok(updated)
    }

    async fn toggle(&self, id: &str, is_enabled: bool) -> DomainResult<Flag> {
        let flag = self.inner.toggle(id, is_enabled).await?;
        self.invalidate(&flag.key).await;
        Ok(flag)
    }

    async fn remove(&self, id: &str) -> DomainResult<()> {
        let flag = self.inner.find_by_id(id).await?;
        self.inner.remove(id).await?;
        self.invalidate(&flag.key).await;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
