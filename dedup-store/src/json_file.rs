use crate::KeySetStore;
use async_trait::async_trait;
use soapbox_core::{Bucket, StoreError};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed store keeping one JSON array per bucket, e.g.
/// `used-urls.json`. This is the store the CLI runs against.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, bucket: Bucket) -> PathBuf {
        self.dir.join(format!("{}.json", bucket.key()))
    }
}

#[async_trait]
impl KeySetStore for JsonFileStore {
    async fn get(&self, bucket: Bucket) -> Result<HashSet<String>, StoreError> {
        let path = self.path_for(bucket);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            // A bucket that was never written is an empty set, not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(StoreError::Unavailable {
                    reason: format!("{}: {e}", path.display()),
                })
            }
        };

        let ids: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                bucket: bucket.key().to_string(),
                details: e.to_string(),
            })?;

        Ok(ids.into_iter().collect())
    }

    async fn put(&self, bucket: Bucket, ids: HashSet<String>) -> Result<(), StoreError> {
        let path = self.path_for(bucket);
        ensure_parent(&path).await?;

        // Sorted output keeps the file diffable between runs.
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();

        let json = serde_json::to_string_pretty(&sorted).map_err(|e| StoreError::WriteFailed {
            bucket: bucket.key().to_string(),
            reason: e.to_string(),
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::WriteFailed {
                bucket: bucket.key().to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;

        debug!(bucket = %bucket, count = ids.len(), path = %path.display(), "Wrote bucket file");
        Ok(())
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: format!("{}: {e}", parent.display()),
            })?;
    }
    Ok(())
}
