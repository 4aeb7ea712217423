//! Feed loading with a time-bounded local cache.
//!
//! [`remote::RemoteFeedLoader`] fetches the feed over HTTP;
//! [`cache::LocalFeedLoader`] saves it through a [`cache::FeedStore`] (a JSON
//! file or a SQLite database) and serves it back while it is fresh.

// Modules for better organization

pub mod cache;
pub mod config;
pub mod feed;
pub mod logging;
pub mod remote;

#[cfg(test)]
mod test_helpers;

// Re-export commonly used types

pub use cache::{
    open_store, CachedFeed, FeedCachePolicy, FeedStore, FeedStoreError, FileFeedStore,
    LocalFeedItem, LocalFeedLoader, SqliteFeedStore,
};
pub use config::{FeedCacheConfig, StoreBackend};
pub use feed::{FeedItem, FeedLoader};
pub use remote::{RemoteFeedError, RemoteFeedLoader};
