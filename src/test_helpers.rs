// Shared fixtures for unit tests
use chrono::{DateTime, Duration, Utc};
use url::Url;
use uuid::Uuid;

use crate::cache::{FeedCachePolicy, LocalFeedItem};
use crate::feed::FeedItem;

pub(crate) fn any_url() -> Url {
    Url::parse("https://a-url.com").unwrap()
}

pub(crate) fn unique_image() -> FeedItem {
    FeedItem::new(
        Uuid::new_v4(),
        Some("any".to_string()),
        Some("any".to_string()),
        any_url(),
    )
}

/// Two images with different optional fields, as domain and local items
pub(crate) fn unique_image_feed() -> (Vec<FeedItem>, Vec<LocalFeedItem>) {
    let models = vec![
        unique_image(),
        FeedItem::new(
            Uuid::new_v4(),
            None,
            None,
            Url::parse("https://another-url.com/image.png").unwrap(),
        ),
    ];
    let local = models.iter().map(LocalFeedItem::from).collect();
    (models, local)
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-10T12:00:00.123456789Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub(crate) fn minus_feed_cache_max_age(date: DateTime<Utc>) -> DateTime<Utc> {
    date - FeedCachePolicy::max_cache_age()
}

pub(crate) fn seconds(n: i64) -> Duration {
    Duration::seconds(n)
}
