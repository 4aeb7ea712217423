use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

use super::store::{FeedStore, FeedStoreError, RetrievalResult};
use super::types::{CachedFeed, LocalFeedItem};

/// Feed store backed by SQLite.
///
/// The snapshot lives in one `feed_cache` row with its items in
/// `feed_cache_items`, ordered by `position`. All operations go through a
/// single connection behind a fair mutex and run on the blocking pool.
#[derive(Clone)]
pub struct SqliteFeedStore {
    pub(crate) db: Arc<Mutex<Connection>>,
}

/// Raw item row, decoded into a [`LocalFeedItem`] after the query finishes
struct ItemRow {
    id: String,
    description: Option<String>,
    location: Option<String>,
    url: String,
}

impl ItemRow {
    fn into_local(self) -> Result<LocalFeedItem, FeedStoreError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| {
            FeedStoreError::Corrupted(format!("invalid item id '{}': {}", self.id, e))
        })?;
        let url = Url::parse(&self.url).map_err(|e| {
            FeedStoreError::Corrupted(format!("invalid item url '{}': {}", self.url, e))
        })?;

        Ok(LocalFeedItem {
            id,
            description: self.description,
            location: self.location,
            url,
        })
    }
}

fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, FeedStoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| FeedStoreError::Corrupted(format!("invalid cache timestamp '{}': {}", raw, e)))
}

impl SqliteFeedStore {
    /// Open (or create) the cache database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FeedStoreError> {
        let conn = Connection::open(path.as_ref())?;

        // Enable WAL mode so separate store instances can share the file
        conn.pragma_update(None, "journal_mode", "WAL")?;

        log::info!("🗄️ Opened feed cache database at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Private in-memory database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self, FeedStoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, FeedStoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::apply_migrations(&conn)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    fn apply_migrations(conn: &Connection) -> Result<(), FeedStoreError> {
        let migration_001 = include_str!("sql/001_feed_cache.sql");
        conn.execute_batch(migration_001)?;
        Ok(())
    }

    /// Wait for the connection, then run `op` on the blocking pool while holding it.
    ///
    /// The statement keeps running if the caller stops waiting, and the
    /// connection is released only once it is done.
    async fn run_exclusive<T, F>(&self, op: F) -> Result<T, FeedStoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, FeedStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let mut conn = Arc::clone(&self.db).lock_owned().await;

        tokio::task::spawn_blocking(move || op(&mut *conn))
            .await
            .map_err(|e| FeedStoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn retrieve(&self) -> RetrievalResult {
        self.run_exclusive(|conn| {
            let record: Option<(i64, String)> = conn
                .query_row(
                    "SELECT id, timestamp FROM feed_cache ORDER BY id LIMIT 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((cache_id, raw_timestamp)) = record else {
                return Ok(None);
            };
            let timestamp = decode_timestamp(&raw_timestamp)?;

            let mut stmt = conn.prepare(
                "SELECT id, description, location, url
                 FROM feed_cache_items
                 WHERE cache_id = ?1
                 ORDER BY position",
            )?;

            let rows = stmt
                .query_map(params![cache_id], |row| {
                    Ok(ItemRow {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        location: row.get(2)?,
                        url: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let feed = rows
                .into_iter()
                .map(ItemRow::into_local)
                .collect::<Result<Vec<_>, _>>()?;

            log::debug!("📦 Retrieved {} cached items from database", feed.len());
            Ok(Some(CachedFeed { feed, timestamp }))
        })
        .await
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), FeedStoreError> {
        let encoded_timestamp = encode_timestamp(timestamp);

        self.run_exclusive(move |conn| {
            // Dropping the transaction without commit rolls everything back
            let tx = conn.transaction()?;

            tx.execute("DELETE FROM feed_cache_items", [])?;
            tx.execute("DELETE FROM feed_cache", [])?;
            tx.execute(
                "INSERT INTO feed_cache (timestamp) VALUES (?1)",
                params![encoded_timestamp],
            )?;
            let cache_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO feed_cache_items
                     (cache_id, position, id, description, location, url)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;

                for (position, item) in feed.iter().enumerate() {
                    stmt.execute(params![
                        cache_id,
                        position as i64,
                        item.id.to_string(),
                        item.description,
                        item.location,
                        item.url.as_str(),
                    ])?;
                }
            }

            tx.commit()?;

            log::debug!("💾 Cached {} items to database", feed.len());
            Ok(())
        })
        .await
    }

    async fn delete(&self) -> Result<(), FeedStoreError> {
        self.run_exclusive(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM feed_cache_items", [])?;
            let removed = tx.execute("DELETE FROM feed_cache", [])?;
            tx.commit()?;

            if removed > 0 {
                log::debug!("🗑️ Removed feed cache from database");
            }
            Ok(())
        })
        .await
    }
}
