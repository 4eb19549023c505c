use dedup_store::{record_used, KeySetStore};
use futures::future::join_all;
use notifier::{notify_best_effort, NotifySink};
use soapbox_core::{Bucket, CoreError, IngestStats, RawItem, ThreadRunId};
use std::collections::HashMap;
use tracing::warn;

/// Counts per source type, for the completion notification.
pub fn stats(items: &[RawItem]) -> IngestStats {
    let mut stats = IngestStats::default();
    for item in items {
        match item {
            RawItem::Tweet { .. } => stats.tweets += 1,
            RawItem::RedditPost { .. } => stats.reddit_posts += 1,
            RawItem::RepoReference { .. } => stats.repos += 1,
            RawItem::RawLink { .. } => {}
        }
    }
    stats
}

fn ids_by_bucket(items: &[RawItem]) -> HashMap<Bucket, Vec<String>> {
    let mut by_bucket: HashMap<Bucket, Vec<String>> = HashMap::new();
    for item in items {
        by_bucket
            .entry(item.bucket())
            .or_default()
            .push(item.canonical_id().to_string());
    }
    by_bucket
}

/// Merges every raw item's id into its source bucket.
///
/// Runs after dispatch on purpose: a crash before this point re-processes
/// the batch on the next pass, a crash after it guarantees no duplicate
/// work. The bucket writes are independent, so they run concurrently.
pub async fn save_ingested<S>(store: &S, items: &[RawItem]) -> Result<(), CoreError>
where
    S: KeySetStore + ?Sized,
{
    let results = join_all(
        ids_by_bucket(items)
            .into_iter()
            .map(|(bucket, ids)| async move { record_used(store, bucket, ids).await }),
    )
    .await;

    for result in results {
        result?;
    }
    Ok(())
}

fn context_lines(context: Option<&ThreadRunId>) -> (String, String) {
    match context {
        Some(id) => (id.run_id.clone(), id.thread_id.clone()),
        None => ("not found".to_string(), "not found".to_string()),
    }
}

fn success_message(stats: &IngestStats, context: Option<&ThreadRunId>) -> String {
    let (run_id, thread_id) = context_lines(context);
    format!(
        "✅ INGESTED DATA SAVED SUCCESSFULLY ✅\n\n\
         Number of tweets: *{}*\n\
         Number of repos: *{}*\n\
         Number of reddit posts: *{}*\n\
         Run ID: *{run_id}*\n\
         Thread ID: *{thread_id}*",
        stats.tweets, stats.repos, stats.reddit_posts
    )
}

fn failure_message(error: &CoreError, context: Option<&ThreadRunId>) -> String {
    let (run_id, thread_id) = context_lines(context);
    format!(
        "FAILED TO SAVE INGESTED DATA: {error}\n\n\
         Run ID: *{run_id}*\n\
         Thread ID: *{thread_id}*"
    )
}

/// Persists the newly-seen ids and reports the outcome to the notification
/// sink.
///
/// Save failures are reported through the failure message and otherwise
/// swallowed; sink failures are logged and swallowed. Neither can fail the
/// scheduling pass that already dispatched its runs.
pub async fn record_and_notify<S, N>(
    store: &S,
    sink: &N,
    items: &[RawItem],
    context: Option<&ThreadRunId>,
) -> IngestStats
where
    S: KeySetStore + ?Sized,
    N: NotifySink + ?Sized,
{
    let stats = stats(items);

    match save_ingested(store, items).await {
        Ok(()) => {
            notify_best_effort(sink, &success_message(&stats, context)).await;
        }
        Err(e) => {
            warn!("Error saving ingested data: {}", e);
            notify_best_effort(sink, &failure_message(&e, context)).await;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_items() -> Vec<RawItem> {
        vec![
            RawItem::Tweet {
                id: "1".to_string(),
                author_id: Some("alice".to_string()),
            },
            RawItem::Tweet {
                id: "2".to_string(),
                author_id: None,
            },
            RawItem::RedditPost {
                id: "t3_x".to_string(),
                url: "https://reddit.com/r/rust/comments/x".to_string(),
            },
            RawItem::RepoReference {
                url: "https://github.com/a/b".to_string(),
            },
        ]
    }

    #[test]
    fn stats_count_by_source_type() {
        let stats = stats(&sample_items());
        assert_eq!(stats.tweets, 2);
        assert_eq!(stats.reddit_posts, 1);
        assert_eq!(stats.repos, 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn linkless_items_are_still_recorded() {
        // A tweet without an author id is never dispatched, but its id is
        // still marked as seen so the next pass skips it.
        let by_bucket = ids_by_bucket(&sample_items());
        assert_eq!(by_bucket[&Bucket::TweetIds].len(), 2);
    }

    #[test]
    fn success_message_contains_counts_and_context() {
        let stats = IngestStats {
            tweets: 3,
            reddit_posts: 2,
            repos: 1,
        };
        let context = ThreadRunId {
            thread_id: "thread-7".to_string(),
            run_id: "run-9".to_string(),
        };

        let message = success_message(&stats, Some(&context));
        assert!(message.contains("Number of tweets: *3*"));
        assert!(message.contains("Number of reddit posts: *2*"));
        assert!(message.contains("Number of repos: *1*"));
        assert!(message.contains("Run ID: *run-9*"));
        assert!(message.contains("Thread ID: *thread-7*"));
    }

    #[test]
    fn missing_context_reads_as_not_found() {
        let message = success_message(&IngestStats::default(), None);
        assert!(message.contains("Run ID: *not found*"));
    }

    #[test]
    fn failure_message_carries_the_error() {
        let error = CoreError::Internal {
            message: "disk full".to_string(),
        };
        let message = failure_message(&error, None);
        assert!(message.contains("FAILED TO SAVE INGESTED DATA"));
        assert!(message.contains("disk full"));
    }
}
