// Remote feed loading over HTTP
use std::sync::Arc;

use anyhow::{anyhow, Result};

pub mod client;
pub mod loader;
pub mod mapper;

pub use client::{HttpClient, HttpClientError, HttpResponse, ReqwestHttpClient};
pub use loader::{RemoteFeedError, RemoteFeedLoader};
pub use mapper::FeedItemsMapper;

use crate::config::FeedCacheConfig;


/// Create a remote loader for the configured feed URL
pub fn create_loader(config: &FeedCacheConfig) -> Result<RemoteFeedLoader> {
    let url = config
        .feed_url
        .clone()
        .ok_or_else(|| anyhow!("Feed URL is required"))?;

    let client = ReqwestHttpClient::new(config.request_timeout(), &config.user_agent)?;

    Ok(RemoteFeedLoader::new(url, Arc::new(client)))
}
