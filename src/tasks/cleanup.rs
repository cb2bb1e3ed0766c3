//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that purges expired entries every `interval`.
///
/// Each run holds the store's write lock for the duration of the scan.
/// Reads already hide expired entries, so the sweep only bounds the memory
/// held by entries nobody reads again.
///
/// The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new(10)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "Starting expiry sweep task");

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so the first sweep
        // happens one full interval after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.write().await.purge_expired();

            if removed > 0 {
                info!(removed, "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));

        cache.write().await.set(
            "expire_soon".to_string(),
            "value".to_string(),
            Duration::from_millis(10),
        );

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Inspect without calling get(), which would purge lazily.
        {
            let guard = cache.read().await;
            assert_eq!(guard.len(), 0, "Sweep should have removed the entry");
            assert_eq!(guard.stats().expirations, 1);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));

        cache.write().await.set(
            "long_lived".to_string(),
            "value".to_string(),
            Duration::from_secs(3600),
        );

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            cache.write().await.get("long_lived"),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheStore::new(100)));

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
