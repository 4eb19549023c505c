use crate::{record_used, JsonFileStore, KeySetStore, MemoryStore, SqliteStore};
use soapbox_core::{Bucket, StoreError};
use std::collections::HashSet;

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn get_of_unwritten_bucket_is_empty() {
    let store = MemoryStore::new();
    let set = store.get(Bucket::TweetIds).await.unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn put_replaces_wholesale() {
    let store = MemoryStore::new();
    store
        .put(Bucket::UsedUrls, ids(&["a", "b", "c"]))
        .await
        .unwrap();
    store.put(Bucket::UsedUrls, ids(&["d"])).await.unwrap();

    // No server-side merge: the second put wins entirely.
    assert_eq!(store.get(Bucket::UsedUrls).await.unwrap(), ids(&["d"]));
}

#[tokio::test]
async fn record_used_unions_with_existing() {
    let store = MemoryStore::new();
    store
        .put(Bucket::RedditPostIds, ids(&["t3_old"]))
        .await
        .unwrap();

    let added = record_used(
        &store,
        Bucket::RedditPostIds,
        ["t3_new".to_string(), "t3_old".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(added, 1);
    assert_eq!(
        store.get(Bucket::RedditPostIds).await.unwrap(),
        ids(&["t3_old", "t3_new"])
    );
}

#[tokio::test]
async fn record_used_is_idempotent() {
    let store = MemoryStore::new();

    for _ in 0..2 {
        record_used(
            &store,
            Bucket::GithubRepoUrls,
            ["https://github.com/a/b".to_string()],
        )
        .await
        .unwrap();
    }

    assert_eq!(
        store.get(Bucket::GithubRepoUrls).await.unwrap(),
        ids(&["https://github.com/a/b"])
    );
}

#[tokio::test]
async fn buckets_are_independent() {
    let store = MemoryStore::new();
    record_used(&store, Bucket::TweetIds, ["1".to_string()])
        .await
        .unwrap();
    record_used(&store, Bucket::RedditPostIds, ["2".to_string()])
        .await
        .unwrap();

    assert_eq!(store.get(Bucket::TweetIds).await.unwrap(), ids(&["1"]));
    assert_eq!(store.get(Bucket::RedditPostIds).await.unwrap(), ids(&["2"]));
}

#[tokio::test]
async fn json_file_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    assert!(store.get(Bucket::UsedUrls).await.unwrap().is_empty());

    store
        .put(Bucket::UsedUrls, ids(&["https://example.com/1"]))
        .await
        .unwrap();
    let added = record_used(
        &store,
        Bucket::UsedUrls,
        ["https://example.com/2".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(added, 1);
    assert_eq!(
        store.get(Bucket::UsedUrls).await.unwrap(),
        ids(&["https://example.com/1", "https://example.com/2"])
    );
}

#[tokio::test]
async fn json_file_store_writes_a_plain_array() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    store
        .put(Bucket::UsedUrls, ids(&["b", "a"]))
        .await
        .unwrap();

    // The file is the external `used-urls.json` surface: a sorted JSON array.
    let raw = std::fs::read_to_string(store.path_for(Bucket::UsedUrls)).unwrap();
    let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn json_file_store_reports_corrupt_data() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::write(store.path_for(Bucket::UsedUrls), "not json").unwrap();

    match store.get(Bucket::UsedUrls).await {
        Err(StoreError::Corrupt { bucket, .. }) => assert_eq!(bucket, "used-urls"),
        other => panic!("expected corrupt-data error, got {other:?}"),
    }
}

#[tokio::test]
async fn sqlite_store_round_trips() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

    assert!(store.get(Bucket::TweetIds).await.unwrap().is_empty());

    store
        .put(Bucket::TweetIds, ids(&["100", "200"]))
        .await
        .unwrap();
    assert_eq!(
        store.get(Bucket::TweetIds).await.unwrap(),
        ids(&["100", "200"])
    );

    // Wholesale replace applies here too.
    store.put(Bucket::TweetIds, ids(&["300"])).await.unwrap();
    assert_eq!(store.get(Bucket::TweetIds).await.unwrap(), ids(&["300"]));
}

#[tokio::test]
async fn sqlite_record_used_matches_union() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store
        .put(Bucket::GithubRepoUrls, ids(&["u1"]))
        .await
        .unwrap();

    record_used(
        &store,
        Bucket::GithubRepoUrls,
        ["u2".to_string(), "u1".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(
        store.get(Bucket::GithubRepoUrls).await.unwrap(),
        ids(&["u1", "u2"])
    );
}
