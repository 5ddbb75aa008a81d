mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Duration;

use common::memory_pool;
use townhall::{
    cache::{CacheStore, QueryCache, SqliteCacheStore},
    error::{AppError, Result},
};

#[tokio::test]
async fn persisted_entries_survive_restart() -> anyhow::Result<()> {
    let pool = memory_pool().await?;
    let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::new(pool.clone()));
    let calls = AtomicUsize::new(0);

    let first = QueryCache::with_store(Duration::seconds(600), store.clone());
    let events: Vec<String> = first
        .fetch("cms:events", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec!["Lantern Walk".to_string()])
        })
        .await?;
    assert_eq!(events, vec!["Lantern Walk"]);

    // Session lookups stay in memory
    let _: Option<String> = first
        .fetch_unpersisted("auth:me:abc", || async { Ok::<_, AppError>(Some("admin".to_string())) })
        .await?;

    let second = QueryCache::with_store(Duration::seconds(600), store);
    assert_eq!(second.hydrate().await?, 1);

    let events: Vec<String> = second
        .fetch("cms:events", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(Vec::new())
        })
        .await?;
    assert_eq!(events, vec!["Lantern Walk"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn expired_entries_are_not_hydrated() -> anyhow::Result<()> {
    let pool = memory_pool().await?;
    let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::new(pool));

    let cache = QueryCache::with_store(Duration::seconds(600), store.clone());
    let _: u32 = cache.fetch("cms:site", || async { Ok::<_, AppError>(7) }).await?;

    // A zero TTL makes everything persisted so far stale
    let restarted = QueryCache::with_store(Duration::seconds(0), store);
    assert_eq!(restarted.hydrate().await?, 0);

    Ok(())
}

#[tokio::test]
async fn invalidation_reaches_the_store() -> anyhow::Result<()> {
    let pool = memory_pool().await?;
    let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::new(pool));
    let cache = QueryCache::with_store(Duration::seconds(600), store.clone());

    for key in ["cms:page:home", "cms:page:about", "cms:events"] {
        let _: bool = cache.fetch(key, || async { Ok::<_, AppError>(true) }).await?;
    }
    assert_eq!(cache.invalidate_prefix("cms:page:").await, 2);
    cache.invalidate("cms:events").await;

    let persisted: Result<Vec<_>> = store.load_all().await;
    assert!(persisted?.is_empty());

    Ok(())
}
