use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::{FeedStore, FeedStoreError, RetrievalResult};
use super::types::{CachedFeed, LocalFeedItem};

/// Feed store keeping the whole snapshot as one JSON file.
///
/// Clones share the same lock, so every operation issued through any clone
/// is run one at a time in the order it asked for the lock. Once an operation
/// holds the lock it runs to completion on the blocking pool, even if the
/// caller stops waiting for it.
///
/// Inserts write a hidden `.<name>.<uuid>.tmp` sibling and rename it over the
/// store file. Only a crash between those two steps can leave such a file
/// behind; it is never read back.
#[derive(Clone)]
pub struct FileFeedStore {
    store_path: Arc<PathBuf>,
    queue: Arc<Mutex<()>>,
}

impl FileFeedStore {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: Arc::new(store_path.into()),
            queue: Arc::new(Mutex::new(())),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Wait for our turn, then run `op` on the blocking pool while holding it
    async fn run_exclusive<T, F>(&self, op: F) -> Result<T, FeedStoreError>
    where
        F: FnOnce(&Path) -> Result<T, FeedStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let turn = Arc::clone(&self.queue).lock_owned().await;
        let store_path = Arc::clone(&self.store_path);

        tokio::task::spawn_blocking(move || {
            let _turn = turn;
            op(store_path.as_path())
        })
        .await
        .map_err(|e| FeedStoreError::Task(e.to_string()))?
    }
}

/// Sibling path the next snapshot is written to before being renamed into place
fn temp_path_for(store_path: &Path) -> PathBuf {
    let file_name = store_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed-cache".to_string());
    store_path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[async_trait]
impl FeedStore for FileFeedStore {
    async fn retrieve(&self) -> RetrievalResult {
        self.run_exclusive(|store_path| {
            let data = match fs::read(store_path) {
                Ok(data) => data,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let cache: CachedFeed = serde_json::from_slice(&data).map_err(|e| {
                FeedStoreError::Corrupted(format!("{}: {}", store_path.display(), e))
            })?;

            log::debug!(
                "📦 Retrieved {} cached items from {}",
                cache.feed.len(),
                store_path.display()
            );
            Ok(Some(cache))
        })
        .await
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), FeedStoreError> {
        let item_count = feed.len();
        let encoded =
            serde_json::to_vec(&CachedFeed { feed, timestamp }).map_err(FeedStoreError::Encode)?;

        self.run_exclusive(move |store_path| {
            // The target is only ever replaced by a rename, so a failed write
            // leaves the previous snapshot untouched.
            let temp_path = temp_path_for(store_path);
            let written =
                write_synced(&temp_path, &encoded).and_then(|()| fs::rename(&temp_path, store_path));
            if let Err(e) = written {
                let _ = fs::remove_file(&temp_path);
                return Err(e.into());
            }

            log::debug!("💾 Cached {} items to {}", item_count, store_path.display());
            Ok(())
        })
        .await
    }

    async fn delete(&self) -> Result<(), FeedStoreError> {
        self.run_exclusive(|store_path| match fs::remove_file(store_path) {
            Ok(()) => {
                log::debug!("🗑️ Removed feed cache {}", store_path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }
}
