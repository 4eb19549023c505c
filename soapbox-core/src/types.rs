use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Key-set namespaces in the dedup store, one per ingestion source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    GithubRepoUrls,
    RedditPostIds,
    TweetIds,
    UsedUrls,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::GithubRepoUrls,
        Bucket::RedditPostIds,
        Bucket::TweetIds,
        Bucket::UsedUrls,
    ];

    /// Stable storage key, shared by every store backend.
    pub fn key(self) -> &'static str {
        match self {
            Bucket::GithubRepoUrls => "github-repo-urls",
            Bucket::RedditPostIds => "reddit-post-ids",
            Bucket::TweetIds => "tweet-ids",
            Bucket::UsedUrls => "used-urls",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One raw item collected by an ingestion pass, before dedup filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawItem {
    #[serde(rename_all = "camelCase")]
    Tweet { id: String, author_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    RedditPost { id: String, url: String },
    #[serde(rename_all = "camelCase")]
    RepoReference { url: String },
    #[serde(rename_all = "camelCase")]
    RawLink { url: String },
}

impl RawItem {
    /// Identifier checked against (and later merged into) the dedup store.
    pub fn canonical_id(&self) -> &str {
        match self {
            RawItem::Tweet { id, .. } => id,
            RawItem::RedditPost { id, .. } => id,
            RawItem::RepoReference { url } => url,
            RawItem::RawLink { url } => url,
        }
    }

    /// Link the planner schedules against. A tweet without an author id has
    /// no public status URL and yields `None`.
    pub fn canonical_link(&self) -> Option<String> {
        match self {
            RawItem::Tweet { id, author_id } => author_id
                .as_ref()
                .map(|author| format!("https://twitter.com/{author}/status/{id}")),
            RawItem::RedditPost { url, .. } => Some(url.clone()),
            RawItem::RepoReference { url } => Some(url.clone()),
            RawItem::RawLink { url } => Some(url.clone()),
        }
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            RawItem::Tweet { .. } => Bucket::TweetIds,
            RawItem::RedditPost { .. } => Bucket::RedditPostIds,
            RawItem::RepoReference { .. } => Bucket::GithubRepoUrls,
            RawItem::RawLink { .. } => Bucket::UsedUrls,
        }
    }
}

/// A (link, delay) pair produced by the scheduling planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub link: String,
    pub after_seconds: u64,
}

/// Opaque handle pair identifying one dispatched run on the job runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRunId {
    pub thread_id: String,
    pub run_id: String,
}

/// Whether a batch of links becomes one downstream job or one job per link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    Single,
    #[default]
    Multiple,
}

impl std::str::FromStr for DispatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(DispatchMode::Single),
            "multiple" => Ok(DispatchMode::Multiple),
            other => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Toggles forwarded verbatim into a dispatched job's configuration.
///
/// The scheduling core never interprets these; their semantics belong to the
/// downstream generation job. Unknown keys survive a round trip via `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfigurable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_to_linkedin_organization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_only_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_content_relevancy_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_used_urls_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DispatchMode>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl RunConfigurable {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_linkedin_organization(mut self, enabled: bool) -> Self {
        self.post_to_linkedin_organization = Some(enabled);
        self
    }

    pub fn with_text_only_mode(mut self, enabled: bool) -> Self {
        self.text_only_mode = Some(enabled);
        self
    }

    /// Skip both the relevancy check and the used-URLs check downstream,
    /// for callers that have already filtered their input.
    pub fn skipping_checks(mut self) -> Self {
        self.skip_content_relevancy_check = Some(true);
        self.skip_used_urls_check = Some(true);
        self
    }
}

/// Counts of ingested items, reported in the run-completion notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub tweets: usize,
    pub reddit_posts: usize,
    pub repos: usize,
}

impl IngestStats {
    pub fn total(&self) -> usize {
        self.tweets + self.reddit_posts + self.repos
    }
}
