// Feed domain model shared by the remote and the local loaders
use async_trait::async_trait;

pub mod types;

pub use types::FeedItem;

/// Anything that can produce the current feed.
///
/// Implemented by the cache-backed [`crate::cache::LocalFeedLoader`] and the
/// HTTP-backed [`crate::remote::RemoteFeedLoader`]; each reports failures with
/// its own error type.
#[async_trait]
pub trait FeedLoader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn load(&self) -> Result<Vec<FeedItem>, Self::Error>;
}
