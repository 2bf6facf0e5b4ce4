//! SQLite-backed cache metadata repository (one row per cache name).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use dealboard_core::ports::CacheMetadataRepository;
use dealboard_domain::{CacheMetadata, Result, SyncStatus};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::deal_repository::map_join_error;
use super::manager::{map_sql_error, DbManager};

pub struct SqliteCacheMetadataRepository {
    db: Arc<DbManager>,
}

impl SqliteCacheMetadataRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CacheMetadataRepository for SqliteCacheMetadataRepository {
    async fn get(&self, cache_name: &str) -> Result<Option<CacheMetadata>> {
        let db = Arc::clone(&self.db);
        let cache_name = cache_name.to_string();

        task::spawn_blocking(move || -> Result<Option<CacheMetadata>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT cache_name, last_sync_at, last_sync_status, last_sync_error,
                        total_records, sync_duration_ms
                 FROM cache_metadata WHERE cache_name = ?1",
                params![cache_name],
                |row| {
                    let status: String = row.get(2)?;
                    let last_sync_at: Option<i64> = row.get(1)?;
                    Ok(CacheMetadata {
                        cache_name: row.get(0)?,
                        last_sync_at: last_sync_at.and_then(|s| DateTime::from_timestamp(s, 0)),
                        last_sync_status: SyncStatus::parse(&status),
                        last_sync_error: row.get(3)?,
                        total_records: row.get(4)?,
                        sync_duration_ms: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert(&self, metadata: &CacheMetadata) -> Result<()> {
        let db = Arc::clone(&self.db);
        let metadata = metadata.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO cache_metadata
                     (cache_name, last_sync_at, last_sync_status, last_sync_error,
                      total_records, sync_duration_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(cache_name) DO UPDATE SET
                     last_sync_at = excluded.last_sync_at,
                     last_sync_status = excluded.last_sync_status,
                     last_sync_error = excluded.last_sync_error,
                     total_records = excluded.total_records,
                     sync_duration_ms = excluded.sync_duration_ms",
                params![
                    metadata.cache_name,
                    metadata.last_sync_at.map(|t| t.timestamp()),
                    metadata.last_sync_status.as_str(),
                    metadata.last_sync_error,
                    metadata.total_records,
                    metadata.sync_duration_ms,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
