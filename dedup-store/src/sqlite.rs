use crate::KeySetStore;
use async_trait::async_trait;
use chrono::Utc;
use soapbox_core::{Bucket, StoreError};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS used_items (
    bucket      TEXT NOT NULL,
    item_id     TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (bucket, item_id)
)";

/// SQLite-backed store for long-lived deployments.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects and creates the schema if needed. A single connection is
    /// enough: the store is read-modify-written by one run at a time.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        info!(database_url, "Connected dedup store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeySetStore for SqliteStore {
    async fn get(&self, bucket: Bucket) -> Result<HashSet<String>, StoreError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT item_id FROM used_items WHERE bucket = ?")
                .bind(bucket.key())
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }

    async fn put(&self, bucket: Bucket, ids: HashSet<String>) -> Result<(), StoreError> {
        let recorded_at = Utc::now().to_rfc3339();

        // Wholesale replace, matching the store contract.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM used_items WHERE bucket = ?")
            .bind(bucket.key())
            .execute(&mut *tx)
            .await?;

        for id in &ids {
            sqlx::query("INSERT INTO used_items (bucket, item_id, recorded_at) VALUES (?, ?, ?)")
                .bind(bucket.key())
                .bind(id)
                .bind(&recorded_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
