use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::feed::FeedItem;

/// Persistence-side copy of a feed item.
///
/// Stores only ever see this type, so the on-disk shape does not move when
/// the domain model does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

/// The whole cache payload: every item plus the moment it was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeed {
    pub feed: Vec<LocalFeedItem>,
    pub timestamp: DateTime<Utc>,
}

impl From<&FeedItem> for LocalFeedItem {
    fn from(item: &FeedItem) -> Self {
        LocalFeedItem {
            id: item.id,
            description: item.description.clone(),
            location: item.location.clone(),
            url: item.image_url.clone(),
        }
    }
}

impl From<LocalFeedItem> for FeedItem {
    fn from(local: LocalFeedItem) -> Self {
        FeedItem {
            id: local.id,
            description: local.description,
            location: local.location,
            image_url: local.url,
        }
    }
}
