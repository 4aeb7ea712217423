use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::policy::FeedCachePolicy;
use super::store::{FeedStore, FeedStoreError};
use super::types::LocalFeedItem;
use crate::feed::{FeedItem, FeedLoader};

// tokio intervals panic on a zero period
const MIN_VALIDATION_PERIOD: Duration = Duration::from_millis(1);

/// Source of "now" for the loader; injected so tests can pin the clock
pub type TimestampProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Saves, loads and validates the cached feed on top of a [`FeedStore`].
///
/// Background work started from a loader is tied to its lifetime: once the
/// loader is dropped (or [`LocalFeedLoader::shutdown`] is called) spawned
/// validation stops before issuing any further store operation.
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    current_date: TimestampProvider,
    lifetime: CancellationToken,
}

impl LocalFeedLoader {
    pub fn new<F>(store: Arc<dyn FeedStore>, current_date: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            store,
            current_date: Arc::new(current_date),
            lifetime: CancellationToken::new(),
        }
    }

    /// Loader reading the wall clock
    pub fn with_system_clock(store: Arc<dyn FeedStore>) -> Self {
        Self::new(store, Utc::now)
    }

    /// Replace the cached feed with `feed`, stamped with the current time.
    ///
    /// The old cache is deleted first; if that fails nothing is inserted and
    /// the deletion error is returned. A failed save leaves the cache in an
    /// unknown state, and it is always safe to save again.
    pub async fn save(&self, feed: &[FeedItem]) -> Result<(), FeedStoreError> {
        if let Err(e) = self.store.delete().await {
            log::warn!("⚠️ Failed to delete cached feed before saving: {}", e);
            return Err(e);
        }

        let local: Vec<LocalFeedItem> = feed.iter().map(LocalFeedItem::from).collect();
        let timestamp = (self.current_date)();

        match self.store.insert(local, timestamp).await {
            Ok(()) => {
                log::info!("✅ Cached {} feed items", feed.len());
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Failed to cache feed: {}", e);
                Err(e)
            }
        }
    }

    /// Cached items if the cache is still fresh, an empty list otherwise.
    ///
    /// Only retrieval errors are reported. An expired cache reads as empty
    /// and is left in place for [`LocalFeedLoader::validate_cache`].
    pub async fn load(&self) -> Result<Vec<FeedItem>, FeedStoreError> {
        match self.store.retrieve().await? {
            Some(cache) if FeedCachePolicy::validate(cache.timestamp, (self.current_date)()) => {
                Ok(cache.feed.into_iter().map(FeedItem::from).collect())
            }
            Some(cache) => {
                log::debug!("⏰ Cached feed from {} has expired", cache.timestamp);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Delete the cache if it is corrupted or expired. Never fails.
    ///
    /// Does nothing once the loader has been shut down.
    pub async fn validate_cache(&self) {
        validate_cache(self.store.as_ref(), &self.current_date, &self.lifetime).await;
    }

    /// Run [`LocalFeedLoader::validate_cache`] on a background task
    pub fn spawn_validate_cache(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let current_date = Arc::clone(&self.current_date);
        let lifetime = self.lifetime.clone();

        tokio::spawn(async move {
            validate_cache(store.as_ref(), &current_date, &lifetime).await;
        })
    }

    /// Validate the cache every `every` until the loader goes away.
    ///
    /// The first validation runs immediately. A zero period is treated as
    /// the shortest one tokio's timer supports.
    pub fn spawn_periodic_validation(&self, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let current_date = Arc::clone(&self.current_date);
        let lifetime = self.lifetime.clone();
        let every = every.max(MIN_VALIDATION_PERIOD);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                tokio::select! {
                    biased;
                    _ = lifetime.cancelled() => break,
                    _ = interval.tick() => {}
                }
                validate_cache(store.as_ref(), &current_date, &lifetime).await;
            }
            log::debug!("🛑 Periodic cache validation stopped");
        })
    }

    /// Stop all background work started from this loader
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

impl Drop for LocalFeedLoader {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

#[async_trait]
impl FeedLoader for LocalFeedLoader {
    type Error = FeedStoreError;

    async fn load(&self) -> Result<Vec<FeedItem>, FeedStoreError> {
        LocalFeedLoader::load(self).await
    }
}

async fn validate_cache(
    store: &dyn FeedStore,
    current_date: &TimestampProvider,
    lifetime: &CancellationToken,
) {
    let retrieved = tokio::select! {
        biased;
        _ = lifetime.cancelled() => return,
        result = store.retrieve() => result,
    };

    // The loader may have gone away while the store was busy
    if lifetime.is_cancelled() {
        return;
    }

    let needs_delete = match retrieved {
        Err(e) => {
            log::warn!("⚠️ Cached feed could not be read, deleting it: {}", e);
            true
        }
        Ok(Some(cache)) if !FeedCachePolicy::validate(cache.timestamp, current_date()) => {
            log::info!("⏰ Deleting expired feed cache from {}", cache.timestamp);
            true
        }
        Ok(_) => false,
    };

    if needs_delete {
        if let Err(e) = store.delete().await {
            log::warn!("⚠️ Failed to delete invalid feed cache: {}", e);
        }
    }
}
