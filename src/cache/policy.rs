use chrono::{DateTime, Duration, Utc};

/// Cached feeds older than this are never served
pub const MAX_CACHE_AGE_DAYS: i64 = 7;

/// Freshness rules for a cached feed
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    pub fn max_cache_age() -> Duration {
        Duration::days(MAX_CACHE_AGE_DAYS)
    }

    /// Whether a feed saved at `timestamp` may still be served at `now`
    pub fn validate(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        Self::is_fresh(timestamp, now, Self::max_cache_age())
    }

    /// Fresh while `now` is strictly before `timestamp + max_age`.
    pub fn is_fresh(timestamp: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
        match timestamp.checked_add_signed(max_age) {
            Some(expires_at) => now < expires_at,
            None => false,
        }
    }
}
