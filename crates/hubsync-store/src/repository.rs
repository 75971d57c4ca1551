//! SQLite implementation of the SyncRecordStore port
//!
//! Handles row mapping and SQL construction for the `sync_records` table.
//!
//! ## Type Mapping
//!
//! | Domain Type  | SQL Type | Strategy                                  |
//! |--------------|----------|-------------------------------------------|
//! | DatasetId    | TEXT     | String via `.as_str()` / `DatasetId::new` |
//! | RemoteId     | TEXT     | String via `.as_str()` / `RemoteId::new`  |
//! | SyncState    | TEXT     | `.name()` / `SyncState::parse`            |
//! | updated_at   | TEXT     | RFC3339 via chrono                        |

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use hubsync_core::domain::{DatasetId, RemoteId, SyncRecord, SyncState};
use hubsync_core::ports::SyncRecordStore;

use crate::StoreError;

/// SQLite-based implementation of the sync-record store port
///
/// All operations go through a connection pool; each statement is a single
/// atomic commit, which is the only serialization point the sync engine
/// relies on.
pub struct SqliteSyncRecordStore {
    pool: SqlitePool,
}

impl SqliteSyncRecordStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Reconstruct a SyncRecord from a database row
fn record_from_row(row: &SqliteRow) -> Result<SyncRecord, StoreError> {
    let dataset_id: String = row.get("dataset_id");
    let remote_owner: String = row.get("remote_owner");
    let remote_id: String = row.get("remote_id");
    let state: String = row.get("state");
    let last_message: Option<String> = row.get("last_message");

    Ok(SyncRecord {
        dataset_id: DatasetId::new(dataset_id),
        remote_owner,
        remote_id: RemoteId::new(remote_id),
        state: SyncState::parse(&state)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?,
        last_message,
    })
}

#[async_trait::async_trait]
impl SyncRecordStore for SqliteSyncRecordStore {
    async fn get(&self, dataset_id: &DatasetId) -> anyhow::Result<Option<SyncRecord>> {
        let row = sqlx::query(
            "SELECT dataset_id, remote_owner, remote_id, state, last_message \
             FROM sync_records WHERE dataset_id = ?",
        )
        .bind(dataset_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        row.as_ref().map(record_from_row).transpose().map_err(Into::into)
    }

    async fn upsert(&self, record: &SyncRecord) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO sync_records \
                 (dataset_id, remote_owner, remote_id, state, last_message, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(dataset_id) DO UPDATE SET \
                 remote_owner = excluded.remote_owner, \
                 remote_id = excluded.remote_id, \
                 state = excluded.state, \
                 last_message = excluded.last_message, \
                 updated_at = excluded.updated_at",
        )
        .bind(record.dataset_id.as_str())
        .bind(&record.remote_owner)
        .bind(record.remote_id.as_str())
        .bind(record.state.name())
        .bind(&record.last_message)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(
            dataset_id = %record.dataset_id,
            state = record.state.name(),
            "Sync record saved"
        );
        Ok(())
    }

    async fn delete(&self, dataset_id: &DatasetId) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM sync_records WHERE dataset_id = ?")
            .bind(dataset_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        tracing::debug!(
            dataset_id = %dataset_id,
            removed = result.rows_affected(),
            "Sync record deleted"
        );
        Ok(())
    }

    async fn list_by_state(&self, state: SyncState) -> anyhow::Result<Vec<SyncRecord>> {
        let rows = sqlx::query(
            "SELECT dataset_id, remote_owner, remote_id, state, last_message \
             FROM sync_records WHERE state = ? ORDER BY dataset_id",
        )
        .bind(state.name())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        rows.iter()
            .map(|row| record_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn count_by_state(&self) -> anyhow::Result<HashMap<String, u64>> {
        let rows = sqlx::query(
            "SELECT state, COUNT(*) AS total FROM sync_records GROUP BY state",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let mut counts = HashMap::new();
        for row in rows {
            let state: String = row.get("state");
            let total: i64 = row.get("total");
            counts.insert(state, total as u64);
        }
        Ok(counts)
    }

    async fn mark_all_pending(&self, dataset_ids: &[DatasetId]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;
        for dataset_id in dataset_ids {
            sqlx::query("UPDATE sync_records SET state = ?, updated_at = ? WHERE dataset_id = ?")
                .bind(SyncState::Pending.name())
                .bind(Utc::now().to_rfc3339())
                .bind(dataset_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from)?;
        }
        tx.commit().await.map_err(StoreError::from)?;

        tracing::debug!(count = dataset_ids.len(), "Sync records reset to pending");
        Ok(())
    }
}
