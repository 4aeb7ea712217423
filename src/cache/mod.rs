pub mod file_store;
pub mod loader;
pub mod policy;
pub mod sqlite_store;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod store_contract;

pub use file_store::FileFeedStore;
pub use loader::{LocalFeedLoader, TimestampProvider};
pub use policy::{FeedCachePolicy, MAX_CACHE_AGE_DAYS};
pub use sqlite_store::SqliteFeedStore;
pub use store::{FeedStore, FeedStoreError, RetrievalResult};
pub use types::{CachedFeed, LocalFeedItem};

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{FeedCacheConfig, StoreBackend};

/// Open the store backend selected by `config`
pub fn open_store(config: &FeedCacheConfig) -> Result<Arc<dyn FeedStore>> {
    match config.backend {
        StoreBackend::File => {
            let path = config.resolve_store_path()?;
            log::info!("📁 Using file feed cache at {}", path.display());
            Ok(Arc::new(FileFeedStore::new(path)))
        }
        StoreBackend::Sqlite => {
            let path = config.resolve_database_path()?;
            let store = SqliteFeedStore::open(&path)
                .with_context(|| format!("Failed to open feed cache database {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Build a cache-backed loader from configuration, reading the system clock.
///
/// Unless the validation interval is zero, the loader also starts validating
/// the cache in the background until it is dropped. That needs a running
/// Tokio runtime.
pub fn init_local_loader(config: &FeedCacheConfig) -> Result<LocalFeedLoader> {
    let every = config.validation_interval();
    if every.is_some() {
        tokio::runtime::Handle::try_current()
            .context("Background cache validation requires a Tokio runtime")?;
    }

    let store = open_store(config)?;
    let loader = LocalFeedLoader::with_system_clock(store);

    if let Some(every) = every {
        loader.spawn_periodic_validation(every);
        log::info!("⏰ Validating feed cache every {:?}", every);
    }

    Ok(loader)
}
