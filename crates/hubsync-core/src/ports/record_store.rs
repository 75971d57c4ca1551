//! Sync record store port (driven/secondary port)
//!
//! Persistence contract for [`SyncRecord`]s. Uses `anyhow::Result` because
//! storage errors are adapter-specific (SQLite today) and need no
//! domain-level classification; callers log and abort.

use std::collections::HashMap;

use crate::domain::{DatasetId, SyncRecord, SyncState};

/// Port trait for persisted per-dataset sync state
///
/// Individual operations must be atomic per record: a failed upsert leaves
/// the previously-stored record intact.
#[async_trait::async_trait]
pub trait SyncRecordStore: Send + Sync {
    /// Retrieves the record for a dataset, if it has ever been synced
    async fn get(&self, dataset_id: &DatasetId) -> anyhow::Result<Option<SyncRecord>>;

    /// Inserts or updates a record (keyed by dataset id)
    async fn upsert(&self, record: &SyncRecord) -> anyhow::Result<()>;

    /// Permanently removes a record; a no-op when absent
    async fn delete(&self, dataset_id: &DatasetId) -> anyhow::Result<()>;

    /// Lists all records in a given state, for the admin status listing
    async fn list_by_state(&self, state: SyncState) -> anyhow::Result<Vec<SyncRecord>>;

    /// Counts records grouped by state name
    async fn count_by_state(&self) -> anyhow::Result<HashMap<String, u64>>;

    /// Resets the listed datasets' records to `Pending`
    ///
    /// Used when an organization's credentials are re-saved, just before a
    /// bulk resync is enqueued. Records that do not exist are skipped.
    async fn mark_all_pending(&self, dataset_ids: &[DatasetId]) -> anyhow::Result<()>;
}
