// HTTP transport used by the remote feed loader
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Any completed HTTP exchange, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The request never produced a response
#[derive(Debug, Error)]
#[error("HTTP request failed: {source}")]
pub struct HttpClientError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl HttpClientError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(e)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}

/// [`HttpClient`] on top of reqwest
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        tracing::debug!(%url, "fetching feed");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "feed request failed");
            HttpClientError::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(%url, status, bytes = body.len(), "feed response received");
        Ok(HttpResponse { status, body })
    }
}
