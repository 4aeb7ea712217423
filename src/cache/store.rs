use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{CachedFeed, LocalFeedItem};

/// Errors reported by a [`FeedStore`] backend
#[derive(Debug, Error)]
pub enum FeedStoreError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cached feed is corrupted: {0}")]
    Corrupted(String),

    #[error("failed to encode feed cache: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cache task execution error: {0}")]
    Task(String),
}

/// `Ok(None)` means nothing is cached; that is not an error.
pub type RetrievalResult = Result<Option<CachedFeed>, FeedStoreError>;

/// Persistence contract for the feed cache.
///
/// A store holds at most one [`CachedFeed`]. Implementations must run the
/// operations issued against one instance one at a time, in the order they
/// were submitted, and must never leave a half-written snapshot behind.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Read the current snapshot without changing anything.
    async fn retrieve(&self) -> RetrievalResult;

    /// Replace whatever is stored with `feed` saved at `timestamp`.
    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), FeedStoreError>;

    /// Remove the snapshot. Succeeds when nothing is stored.
    async fn delete(&self) -> Result<(), FeedStoreError>;
}
