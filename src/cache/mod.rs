//! Time-bound query cache for CMS and session lookups.
//!
//! Entries are keyed by request identity (`cms:page:home`, `auth:me:<hash>`)
//! and hold the decoded payload as JSON. An entry younger than the TTL is
//! served without touching the network. Older entries are refetched, and kept
//! as a fallback when the refetch fails. Persistence through a [`CacheStore`]
//! is best-effort: a store failure is logged and never fails the request.
//!
//! Keys can come from visitor input (URL slugs, cookies), so the map is
//! bounded and empty answers (`null`) are never persisted.

pub mod store;

use std::{collections::HashMap, future::Future, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::Result;

pub use store::SqliteCacheStore;

pub const DEFAULT_TTL_SECS: i64 = 600;
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<(String, CacheEntry)>>;
    async fn save(&self, key: &str, entry: &CacheEntry) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn remove_prefix(&self, prefix: &str) -> Result<u64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
}

pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    store: Option<Arc<dyn CacheStore>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            store: None,
        }
    }

    pub fn with_store(ttl: Duration, store: Arc<dyn CacheStore>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            store: Some(store),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Load persisted entries that are still within the TTL.
    pub async fn hydrate(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let now = Utc::now();
        let persisted = store.load_all().await?;
        let mut entries = self.entries.write().await;
        let mut loaded = 0;
        for (key, entry) in persisted {
            if self.is_fresh(&entry, now) {
                entries.insert(key, entry);
                loaded += 1;
            }
        }

        tracing::debug!("Hydrated {} cached queries", loaded);
        Ok(loaded)
    }

    /// Serve `key` from cache when fresh, otherwise run `fetcher` and cache
    /// its result. Persisted to the store.
    pub async fn fetch<T, F, Fut>(&self, key: &str, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.fetch_inner(key, true, fetcher).await
    }

    /// Same as [`QueryCache::fetch`] but kept in memory only.
    pub async fn fetch_unpersisted<T, F, Fut>(&self, key: &str, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.fetch_inner(key, false, fetcher).await
    }

    async fn fetch_inner<T, F, Fut>(&self, key: &str, persist: bool, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cached = self.entries.read().await.get(key).cloned();

        if let Some(entry) = &cached {
            if self.is_fresh(entry, Utc::now()) {
                match serde_json::from_value::<T>(entry.value.clone()) {
                    Ok(value) => {
                        tracing::trace!("Cache hit for {}", key);
                        return Ok(value);
                    }
                    Err(e) => tracing::warn!("Discarding undecodable cache entry {}: {}", key, e),
                }
            }
        }

        match fetcher().await {
            Ok(value) => {
                let entry = CacheEntry {
                    value: serde_json::to_value(&value)?,
                    fetched_at: Utc::now(),
                };
                if persist && !entry.value.is_null() {
                    self.persist(key, &entry).await;
                }
                let mut entries = self.entries.write().await;
                if !entries.contains_key(key) {
                    self.make_room(&mut entries, entry.fetched_at);
                }
                entries.insert(key.to_string(), entry);
                Ok(value)
            }
            Err(err) => {
                let stale = cached.and_then(|entry| serde_json::from_value::<T>(entry.value).ok());
                match stale {
                    Some(value) => {
                        tracing::warn!("Serving stale {} after fetch failure: {}", key, err);
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(key).await {
                tracing::warn!("Failed to remove persisted cache entry {}: {}", key, e);
            }
        }
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|k, _| !k.starts_with(prefix));
            before - entries.len()
        };
        if let Some(store) = &self.store {
            if let Err(e) = store.remove_prefix(prefix).await {
                tracing::warn!("Failed to remove persisted cache entries {}*: {}", prefix, e);
            }
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.entries.read().await;
        let fresh = entries.values().filter(|e| self.is_fresh(e, now)).count();
        CacheStats {
            entries: entries.len(),
            fresh,
            stale: entries.len() - fresh,
        }
    }

    /// Bring the map below capacity: drop expired empty answers, then evict
    /// the oldest entries, empty answers before real content.
    fn make_room(&self, entries: &mut HashMap<String, CacheEntry>, now: DateTime<Utc>) {
        if entries.len() < self.max_entries {
            return;
        }

        entries.retain(|_, e| !e.value.is_null() || self.is_fresh(e, now));
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| (!e.value.is_null(), e.fetched_at))
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    tracing::trace!("Evicting cache entry {}", key);
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    async fn persist(&self, key: &str, entry: &CacheEntry) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(key, entry).await {
                tracing::warn!("Failed to persist cache entry {}: {}", key, e);
            }
        }
    }

    #[cfg(test)]
    async fn backdate(&self, key: &str, age: Duration) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.fetched_at = entry.fetched_at - age;
        }
    }
}

/// Build a cache key from its parts: `key(&["cms", "page", "home"])` is `cms:page:home`.
pub fn key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Key part for a secret value (e.g. a session cookie), so raw secrets never
/// become cache keys.
pub fn hashed(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
