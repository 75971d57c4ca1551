//! Per-dataset sync state tracking
//!
//! A [`SyncRecord`] exists iff its dataset has been synced at least once.
//! It is created lazily on the first sync attempt and removed permanently
//! when a remote delete succeeds (or the remote already reports not-found).

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{DatasetId, RemoteId};

/// Outcome state of the last sync attempt for a dataset
///
/// `Failed` is recoverable, not terminal: the next external trigger retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Record created, no successful remote write yet
    Pending,
    /// The remote mirror reflects the local dataset
    UpToDate,
    /// The last remote write was rejected
    Failed,
}

impl SyncState {
    /// Storage / display name of the state
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SyncState::Pending => "pending",
            SyncState::UpToDate => "uptodate",
            SyncState::Failed => "failed",
        }
    }

    /// Parse a state from its stored string representation
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(SyncState::Pending),
            "uptodate" => Ok(SyncState::UpToDate),
            "failed" => Ok(SyncState::Failed),
            other => Err(DomainError::UnknownState(other.to_string())),
        }
    }
}

/// Persisted sync state for a single local dataset
///
/// Keyed 1:1 with the local dataset and exclusively owned by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Local dataset this record tracks (primary key)
    pub dataset_id: DatasetId,
    /// Remote account the dataset was synced under
    pub remote_owner: String,
    /// Remote dataset id: provisional slug until the create response
    /// supplies a canonical id
    pub remote_id: RemoteId,
    /// Outcome of the last sync attempt
    pub state: SyncState,
    /// Raw body of the last remote response, kept for diagnostics
    pub last_message: Option<String>,
}

impl SyncRecord {
    /// Creates a fresh record in `Pending` state with a provisional remote id
    pub fn new(
        dataset_id: DatasetId,
        remote_owner: impl Into<String>,
        provisional_id: RemoteId,
    ) -> Self {
        Self {
            dataset_id,
            remote_owner: remote_owner.into(),
            remote_id: provisional_id,
            state: SyncState::Pending,
            last_message: None,
        }
    }
}
