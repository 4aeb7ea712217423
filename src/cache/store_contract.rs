// Behaviour every FeedStore backend has to share. Each backend's test module
// runs these against its own instance.
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::FeedStore;
use super::types::{CachedFeed, LocalFeedItem};
use crate::test_helpers::{any_url, unique_image_feed};

const SNAPSHOT_SIZE: usize = 5;

pub(crate) async fn expect_retrieve_empty(store: &dyn FeedStore) {
    match store.retrieve().await {
        Ok(None) => {}
        other => panic!("Expected empty cache, got {:?} instead", other),
    }
}

pub(crate) async fn expect_retrieve_found(
    store: &dyn FeedStore,
    feed: &[LocalFeedItem],
    timestamp: DateTime<Utc>,
) {
    match store.retrieve().await {
        Ok(Some(cache)) => {
            assert_eq!(cache.feed, feed);
            assert_eq!(cache.timestamp, timestamp);
        }
        other => panic!(
            "Expected found result with {} items at {}, got {:?} instead",
            feed.len(),
            timestamp,
            other
        ),
    }
}

pub(crate) async fn expect_retrieve_failure(store: &dyn FeedStore) {
    if let Ok(result) = store.retrieve().await {
        panic!("Expected retrieval failure, got {:?} instead", result);
    }
}

pub(crate) async fn assert_retrieve_delivers_empty_on_empty_cache(store: &dyn FeedStore) {
    expect_retrieve_empty(store).await;
}

pub(crate) async fn assert_retrieve_has_no_side_effects_on_empty_cache(store: &dyn FeedStore) {
    expect_retrieve_empty(store).await;
    expect_retrieve_empty(store).await;
}

pub(crate) async fn assert_retrieve_delivers_found_values_on_non_empty_cache(
    store: &dyn FeedStore,
) {
    let (_, feed) = unique_image_feed();
    let timestamp = Utc::now();

    store.insert(feed.clone(), timestamp).await.unwrap();

    expect_retrieve_found(store, &feed, timestamp).await;
}

pub(crate) async fn assert_retrieve_has_no_side_effects_on_non_empty_cache(
    store: &dyn FeedStore,
) {
    let (_, feed) = unique_image_feed();
    let timestamp = Utc::now();

    store.insert(feed.clone(), timestamp).await.unwrap();

    expect_retrieve_found(store, &feed, timestamp).await;
    expect_retrieve_found(store, &feed, timestamp).await;
}

pub(crate) async fn assert_insert_delivers_no_error_on_empty_cache(store: &dyn FeedStore) {
    let (_, feed) = unique_image_feed();

    assert!(store.insert(feed, Utc::now()).await.is_ok());
}

pub(crate) async fn assert_insert_delivers_no_error_on_non_empty_cache(store: &dyn FeedStore) {
    store.insert(unique_image_feed().1, Utc::now()).await.unwrap();

    assert!(store.insert(unique_image_feed().1, Utc::now()).await.is_ok());
}

pub(crate) async fn assert_insert_overrides_previously_inserted_cache_values(
    store: &dyn FeedStore,
) {
    store.insert(unique_image_feed().1, Utc::now()).await.unwrap();

    let (_, latest_feed) = unique_image_feed();
    let latest_timestamp = Utc::now();
    store
        .insert(latest_feed.clone(), latest_timestamp)
        .await
        .unwrap();

    expect_retrieve_found(store, &latest_feed, latest_timestamp).await;
}

pub(crate) async fn assert_insert_preserves_item_order(store: &dyn FeedStore) {
    let feed: Vec<LocalFeedItem> = (0..5).flat_map(|_| unique_image_feed().1).collect();
    let timestamp = Utc::now();

    store.insert(feed.clone(), timestamp).await.unwrap();

    expect_retrieve_found(store, &feed, timestamp).await;
}

pub(crate) async fn assert_insert_accepts_empty_feed(store: &dyn FeedStore) {
    let timestamp = Utc::now();

    store.insert(Vec::new(), timestamp).await.unwrap();

    expect_retrieve_found(store, &[], timestamp).await;
}

pub(crate) async fn assert_delete_delivers_no_error_on_empty_cache(store: &dyn FeedStore) {
    assert!(store.delete().await.is_ok());
}

pub(crate) async fn assert_delete_has_no_side_effects_on_empty_cache(store: &dyn FeedStore) {
    store.delete().await.unwrap();

    expect_retrieve_empty(store).await;
}

pub(crate) async fn assert_delete_delivers_no_error_on_non_empty_cache(store: &dyn FeedStore) {
    store.insert(unique_image_feed().1, Utc::now()).await.unwrap();

    assert!(store.delete().await.is_ok());
}

pub(crate) async fn assert_delete_empties_previously_inserted_cache(store: &dyn FeedStore) {
    store.insert(unique_image_feed().1, Utc::now()).await.unwrap();

    store.delete().await.unwrap();

    expect_retrieve_empty(store).await;
}

/// Submits insert, delete, insert without waiting in between and checks they
/// finish in that order, leaving the last insert in place.
pub(crate) async fn assert_side_effects_run_serially(store: &dyn FeedStore) {
    let completed = Mutex::new(Vec::new());
    let (_, last_feed) = unique_image_feed();
    let last_timestamp = Utc::now();

    let first_insert = async {
        store.insert(unique_image_feed().1, Utc::now()).await.unwrap();
        completed.lock().unwrap().push("first insert");
    };
    let delete = async {
        store.delete().await.unwrap();
        completed.lock().unwrap().push("delete");
    };
    let last_insert = async {
        store.insert(last_feed.clone(), last_timestamp).await.unwrap();
        completed.lock().unwrap().push("last insert");
    };

    tokio::join!(first_insert, delete, last_insert);

    assert_eq!(
        *completed.lock().unwrap(),
        vec!["first insert", "delete", "last insert"],
        "Expected side-effects to run serially but operations finished in the wrong order"
    );
    expect_retrieve_found(store, &last_feed, last_timestamp).await;
}

/// Items that all carry `tag`, with their position stored as the location
fn tagged_feed(tag: &str) -> Vec<LocalFeedItem> {
    (0..SNAPSHOT_SIZE)
        .map(|position| LocalFeedItem {
            id: Uuid::new_v4(),
            description: Some(tag.to_string()),
            location: Some(position.to_string()),
            url: any_url(),
        })
        .collect()
}

fn assert_snapshot_is_whole(cache: &CachedFeed) {
    assert_eq!(
        cache.feed.len(),
        SNAPSHOT_SIZE,
        "Expected a whole snapshot, got {} items",
        cache.feed.len()
    );

    let tag = &cache.feed[0].description;
    for (position, item) in cache.feed.iter().enumerate() {
        assert_eq!(&item.description, tag, "Snapshot mixes items from different inserts");
        assert_eq!(item.location, Some(position.to_string()), "Snapshot items out of order");
    }
}

/// Writers and readers on separate tasks across worker threads. Readers must
/// only ever see an empty cache or one complete snapshot from a single insert.
pub(crate) async fn assert_concurrent_side_effects_never_expose_partial_snapshot(
    store: Arc<dyn FeedStore>,
) {
    let mut tasks = Vec::new();

    for writer in 0..4 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            for round in 0..10 {
                let tag = format!("writer {} round {}", writer, round);
                store.insert(tagged_feed(&tag), Utc::now()).await.unwrap();
                if round % 3 == 0 {
                    store.delete().await.unwrap();
                }
            }
        }));
    }

    for _ in 0..4 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            for _ in 0..20 {
                if let Some(cache) = store.retrieve().await.unwrap() {
                    assert_snapshot_is_whole(&cache);
                }
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    if let Some(cache) = store.retrieve().await.unwrap() {
        assert_snapshot_is_whole(&cache);
    }
}
