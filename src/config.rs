use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

const CACHE_DIR_NAME: &str = "essential-feed";
const DEFAULT_STORE_FILE: &str = "feed-cache.json";
const DEFAULT_DATABASE_FILE: &str = "feed-cache.db";

/// Which persistence backend holds the feed cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    File,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedCacheConfig {
    pub backend: StoreBackend,

    /// JSON file used by the file backend
    pub store_path: Option<PathBuf>,

    /// Database file used by the SQLite backend
    pub database_path: Option<PathBuf>,

    /// Where the remote feed is fetched from
    pub feed_url: Option<Url>,

    pub request_timeout_ms: u64,
    pub user_agent: String,

    /// How often the background task checks for expired or corrupted caches.
    /// `0` turns the background task off.
    pub validation_interval_secs: u64,
}

impl Default for FeedCacheConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            store_path: None,
            database_path: None,
            feed_url: None,
            request_timeout_ms: 30_000,
            user_agent: format!("essential-feed/{}", env!("CARGO_PKG_VERSION")),
            validation_interval_secs: 3600,
        }
    }
}

impl FeedCacheConfig {
    /// Parse a JSON config document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse feed cache config")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validation_interval(&self) -> Option<Duration> {
        match self.validation_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn resolve_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_cache_dir()?.join(DEFAULT_STORE_FILE)),
        }
    }

    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_cache_dir()?.join(DEFAULT_DATABASE_FILE)),
        }
    }
}

/// Platform cache directory (or the home directory) plus our own folder
fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

    let dir = base.join(CACHE_DIR_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;

    Ok(dir)
}
