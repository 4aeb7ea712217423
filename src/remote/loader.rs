use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::client::HttpClient;
use super::mapper::FeedItemsMapper;
use crate::feed::{FeedItem, FeedLoader};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFeedError {
    #[error("could not reach the feed server")]
    Connectivity,

    #[error("feed server returned invalid data")]
    InvalidData,
}

/// Loads the feed from a remote endpoint, one GET per call
pub struct RemoteFeedLoader {
    url: Url,
    client: Arc<dyn HttpClient>,
}

impl RemoteFeedLoader {
    pub fn new(url: Url, client: Arc<dyn HttpClient>) -> Self {
        Self { url, client }
    }

    pub async fn load(&self) -> Result<Vec<FeedItem>, RemoteFeedError> {
        let response = self.client.get(&self.url).await.map_err(|e| {
            log::warn!("⚠️ Feed request to {} failed: {}", self.url, e);
            RemoteFeedError::Connectivity
        })?;

        let items = FeedItemsMapper::map(&response.body, response.status)?;
        log::info!("✅ Loaded {} feed items from {}", items.len(), self.url);
        Ok(items)
    }
}

#[async_trait]
impl FeedLoader for RemoteFeedLoader {
    type Error = RemoteFeedError;

    async fn load(&self) -> Result<Vec<FeedItem>, RemoteFeedError> {
        RemoteFeedLoader::load(self).await
    }
}
