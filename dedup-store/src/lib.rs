use async_trait::async_trait;
use soapbox_core::{Bucket, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub mod json_file;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Persistent key-sets of already-processed identifiers, partitioned by
/// source type.
///
/// `put` replaces the stored set wholesale; callers own the read-union-write
/// cycle (see [`record_used`]). There is no server-side merge, so two runs
/// mutating the same bucket in parallel can lose an update. The consequence
/// is re-processing those ids on the next pass, never corruption, and runs
/// that care about dedup correctness must not execute in true parallel.
#[async_trait]
pub trait KeySetStore: Send + Sync {
    /// Returns the stored set for `bucket`, empty if nothing was ever written.
    async fn get(&self, bucket: Bucket) -> Result<HashSet<String>, StoreError>;

    /// Replaces the stored set for `bucket` wholesale.
    async fn put(&self, bucket: Bucket, ids: HashSet<String>) -> Result<(), StoreError>;
}

/// Merges `newly_seen` into the stored set for `bucket` and writes the union
/// back. Returns how many ids were actually new.
///
/// Not atomic end-to-end: a crash between the read and the write loses the
/// update and those ids get re-dispatched on the next pass.
pub async fn record_used<S>(
    store: &S,
    bucket: Bucket,
    newly_seen: impl IntoIterator<Item = String> + Send,
) -> Result<usize, StoreError>
where
    S: KeySetStore + ?Sized,
{
    let mut ids = store.get(bucket).await?;
    let before = ids.len();
    ids.extend(newly_seen);
    let added = ids.len() - before;
    store.put(bucket, ids).await?;

    debug!(bucket = %bucket, added, "Recorded newly seen ids");
    Ok(added)
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    buckets: Arc<RwLock<HashMap<Bucket, HashSet<String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeySetStore for MemoryStore {
    async fn get(&self, bucket: Bucket) -> Result<HashSet<String>, StoreError> {
        let buckets = self.buckets.read().await;
        Ok(buckets.get(&bucket).cloned().unwrap_or_default())
    }

    async fn put(&self, bucket: Bucket, ids: HashSet<String>) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write().await;
        buckets.insert(bucket, ids);
        Ok(())
    }
}
