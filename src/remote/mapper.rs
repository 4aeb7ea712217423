use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::loader::RemoteFeedError;
use crate::feed::FeedItem;

const OK_200: u16 = 200;

// Wire format of the feed endpoint
#[derive(Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

#[derive(Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

impl From<RemoteFeedItem> for FeedItem {
    fn from(item: RemoteFeedItem) -> Self {
        FeedItem::new(item.id, item.description, item.location, item.image)
    }
}

/// Turns a feed endpoint response into domain items
pub struct FeedItemsMapper;

impl FeedItemsMapper {
    pub fn map(body: &[u8], status: u16) -> Result<Vec<FeedItem>, RemoteFeedError> {
        if status != OK_200 {
            return Err(RemoteFeedError::InvalidData);
        }

        let root: Root = serde_json::from_slice(body).map_err(|e| {
            log::warn!("⚠️ Could not decode feed payload: {}", e);
            RemoteFeedError::InvalidData
        })?;

        Ok(root.items.into_iter().map(FeedItem::from).collect())
    }
}
