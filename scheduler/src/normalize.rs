use dedup_store::KeySetStore;
use soapbox_core::{Bucket, CoreError, RawItem};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Canonical links for `items`, in input order, with already-processed items
/// removed.
///
/// Order matters downstream: the planner's delay grows with position, so
/// this is a stable filter. Two drop cases, both silent by policy:
/// an item with no derivable link (a tweet lacking its author id), and an
/// item whose canonical id is already in the dedup store.
///
/// Store reads happen on the primary path, so a store failure propagates
/// here instead of degrading to an empty snapshot.
pub async fn filter_new_links<S>(store: &S, items: &[RawItem]) -> Result<Vec<String>, CoreError>
where
    S: KeySetStore + ?Sized,
{
    let mut snapshots: HashMap<Bucket, HashSet<String>> = HashMap::new();
    for bucket in Bucket::ALL {
        if items.iter().any(|item| item.bucket() == bucket) {
            snapshots.insert(bucket, store.get(bucket).await?);
        }
    }

    Ok(filter_against_snapshots(items, &snapshots))
}

/// Pure core of the filter, usable with a pre-read snapshot.
pub fn filter_against_snapshots(
    items: &[RawItem],
    snapshots: &HashMap<Bucket, HashSet<String>>,
) -> Vec<String> {
    let mut links = Vec::new();

    for item in items {
        let Some(link) = item.canonical_link() else {
            debug!(id = item.canonical_id(), "Dropping item without a derivable link");
            continue;
        };

        let already_seen = snapshots
            .get(&item.bucket())
            .is_some_and(|seen| seen.contains(item.canonical_id()));
        if already_seen {
            debug!(id = item.canonical_id(), "Dropping already-processed item");
            continue;
        }

        links.push(link);
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedup_store::MemoryStore;

    fn tweet(id: &str, author: Option<&str>) -> RawItem {
        RawItem::Tweet {
            id: id.to_string(),
            author_id: author.map(|a| a.to_string()),
        }
    }

    #[tokio::test]
    async fn output_preserves_input_order() {
        let store = MemoryStore::new();
        let items = vec![
            tweet("1", Some("alice")),
            RawItem::RedditPost {
                id: "t3_x".to_string(),
                url: "https://reddit.com/r/rust/comments/x".to_string(),
            },
            RawItem::RepoReference {
                url: "https://github.com/a/b".to_string(),
            },
        ];

        let links = filter_new_links(&store, &items).await.unwrap();
        assert_eq!(
            links,
            vec![
                "https://twitter.com/alice/status/1".to_string(),
                "https://reddit.com/r/rust/comments/x".to_string(),
                "https://github.com/a/b".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn linkless_items_are_dropped_not_errors() {
        let store = MemoryStore::new();
        let items = vec![
            tweet("1", None),
            tweet("2", Some("bob")),
            tweet("3", None),
        ];

        let links = filter_new_links(&store, &items).await.unwrap();
        assert_eq!(links, vec!["https://twitter.com/bob/status/2".to_string()]);
    }

    #[tokio::test]
    async fn items_present_in_the_store_are_filtered_out() {
        let store = MemoryStore::new();
        store
            .put(Bucket::TweetIds, HashSet::from(["1".to_string()]))
            .await
            .unwrap();
        store
            .put(
                Bucket::GithubRepoUrls,
                HashSet::from(["https://github.com/a/b".to_string()]),
            )
            .await
            .unwrap();

        let items = vec![
            tweet("1", Some("alice")),
            tweet("2", Some("alice")),
            RawItem::RepoReference {
                url: "https://github.com/a/b".to_string(),
            },
        ];

        let links = filter_new_links(&store, &items).await.unwrap();
        assert_eq!(
            links,
            vec!["https://twitter.com/alice/status/2".to_string()]
        );
    }

    #[tokio::test]
    async fn dedup_is_scoped_per_bucket() {
        let store = MemoryStore::new();
        // The same id in a different bucket must not shadow a tweet.
        store
            .put(Bucket::RedditPostIds, HashSet::from(["1".to_string()]))
            .await
            .unwrap();

        let links = filter_new_links(&store, &[tweet("1", Some("alice"))])
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn empty_input_is_fine() {
        let store = MemoryStore::new();
        let links = filter_new_links(&store, &[]).await.unwrap();
        assert!(links.is_empty());
    }
}
