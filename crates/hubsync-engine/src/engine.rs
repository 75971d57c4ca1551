//! Synchronization state machine
//!
//! One [`SyncEngine::notify`] call handles one dataset. The engine
//! re-fetches the authoritative snapshot, builds the remote payload,
//! lazily creates the sync record, resolves a single [`SyncAction`], and
//! dispatches:
//!
//! - **Create**: PUT create-or-replace at the provisional id; a canonical
//!   id in the response overwrites the provisional one.
//! - **Update**: dirty-check GET first; identical payloads skip the write
//!   entirely. A 404 means the dataset vanished remotely and falls through
//!   to create.
//! - **Delete**: 200 and 404 both count as success and remove the sync
//!   record permanently.
//!
//! HTTP 429 re-enqueues the same sync with an incremented attempt counter,
//! up to a configurable cap, and leaves the record state untouched. No
//! error escapes a sync job: remote rejections become `failed` state with
//! the raw response body as diagnostic, and transport failures are recorded
//! the same way.

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use hubsync_core::config::Config;
use hubsync_core::domain::{
    Credentials, CredentialsError, DatasetId, DatasetState, RemoteId, SyncRecord, SyncState,
};
use hubsync_core::payload::{build_payload, dataset_slug, RemotePayload, SiteContext};
use hubsync_core::ports::{ApiResponse, JobQueue, LocalCatalog, RemoteCatalog, SyncJob,
    SyncRecordStore};

/// What a dispatched sync ended as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote mirror now matches the local dataset
    Synced,
    /// Nothing to do: dirty-check found no difference
    Skipped,
    /// The remote dataset and the sync record are gone
    Deleted,
    /// Rate limited; a retry was scheduled (or abandoned at the cap)
    RateLimited,
    /// The remote service rejected the write
    Failed,
}

/// The single dispatch decision of a sync call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncAction {
    Create,
    Update,
    Delete,
}

/// How the dispatched path left the sync record
enum PathResult {
    /// Persist the (possibly mutated) record
    Persist(SyncOutcome),
    /// The record was removed from the store
    Removed,
    /// Record untouched for this sync
    Skipped,
}

/// The synchronization engine
///
/// Holds the four ports plus the per-process context. Cheap to share:
/// everything behind `Arc`.
pub struct SyncEngine {
    datasets: Arc<dyn LocalCatalog>,
    records: Arc<dyn SyncRecordStore>,
    remote: Arc<dyn RemoteCatalog>,
    queue: Arc<dyn JobQueue>,
    site: SiteContext,
    max_attempts: u32,
}

impl SyncEngine {
    /// Creates an engine over the given ports, taking site URL and retry
    /// cap from the configuration
    pub fn new(
        datasets: Arc<dyn LocalCatalog>,
        records: Arc<dyn SyncRecordStore>,
        remote: Arc<dyn RemoteCatalog>,
        queue: Arc<dyn JobQueue>,
        config: &Config,
    ) -> Self {
        Self {
            datasets,
            records,
            remote,
            queue,
            site: SiteContext::new(config.site.url.clone()),
            max_attempts: config.sync.max_request_attempts,
        }
    }

    /// Entry point for a sync trigger
    ///
    /// Returns `Ok(false)` when the dataset is skipped: not the syncable
    /// kind, no organization credentials, integration disabled, or still a
    /// draft. Returns `Ok(true)` when a sync attempt was dispatched.
    pub async fn notify(&self, dataset_id: &DatasetId, attempt: u32) -> Result<bool> {
        let Some(snapshot) = self.datasets.snapshot(dataset_id).await? else {
            warn!(dataset_id = %dataset_id, "Dataset no longer exists, skipping sync");
            return Ok(false);
        };
        if !snapshot.is_syncable_kind() {
            debug!(dataset_id = %dataset_id, kind = %snapshot.kind, "Kind is not syncable, skipping");
            return Ok(false);
        }
        let Some(org) = snapshot.org.as_ref() else {
            debug!(dataset_id = %dataset_id, "Dataset has no organization, skipping");
            return Ok(false);
        };
        let Some(creds) = self.datasets.credentials_for(org).await? else {
            debug!(dataset_id = %dataset_id, org = %org, "No credentials, skipping");
            return Ok(false);
        };
        if !creds.integration_enabled {
            debug!(dataset_id = %dataset_id, org = %org, "Integration disabled, skipping");
            return Ok(false);
        }
        if snapshot.state == DatasetState::Draft {
            debug!(dataset_id = %dataset_id, "Dataset is a draft, skipping");
            return Ok(false);
        }

        self.sync(dataset_id, &creds, attempt).await?;
        Ok(true)
    }

    /// Runs one sync attempt for a dataset
    ///
    /// Re-fetches the snapshot (a caller-supplied copy could be stale under
    /// concurrent edits), so the payload always reflects the latest local
    /// state.
    pub async fn sync(
        &self,
        dataset_id: &DatasetId,
        creds: &Credentials,
        attempt: u32,
    ) -> Result<SyncOutcome> {
        let Some(snapshot) = self.datasets.snapshot(dataset_id).await? else {
            warn!(dataset_id = %dataset_id, "Dataset vanished before sync could run");
            return Ok(SyncOutcome::Skipped);
        };
        let payload = build_payload(&snapshot, &self.site);

        let existing = self.records.get(dataset_id).await?;

        // Resolve the action once, before the record is lazily created:
        // only a pre-existing record with a remote id takes the update path.
        let action = if snapshot.state == DatasetState::Deleted {
            SyncAction::Delete
        } else if existing
            .as_ref()
            .is_some_and(|record| !record.remote_id.is_empty())
        {
            SyncAction::Update
        } else {
            SyncAction::Create
        };

        let mut record = match existing {
            Some(record) => record,
            None => {
                let provisional = if snapshot.name.is_empty() {
                    RemoteId::new(dataset_slug(&snapshot.title))
                } else {
                    RemoteId::new(snapshot.name.clone())
                };
                let record = SyncRecord::new(dataset_id.clone(), &creds.owner, provisional);
                // Local commit before any remote call; a store failure
                // aborts the attempt with nothing half-written.
                if let Err(e) = self.records.upsert(&record).await {
                    error!(dataset_id = %dataset_id, error = %e, "Could not persist new sync record");
                    return Err(e);
                }
                record
            }
        };

        debug!(dataset_id = %dataset_id, action = ?action, attempt, "Dispatching sync");

        let result = match action {
            SyncAction::Create => self.create_path(&payload, &mut record, creds, attempt).await,
            SyncAction::Update => self.update_path(&payload, &mut record, creds, attempt).await,
            SyncAction::Delete => self.delete_path(&payload, &mut record, creds, attempt).await,
        };

        match result {
            PathResult::Persist(outcome) => {
                // The commit is per-record atomic; on failure the previous
                // record survives and the failure stays inside this job.
                if let Err(e) = self.records.upsert(&record).await {
                    error!(dataset_id = %dataset_id, error = %e, "Could not persist sync outcome");
                }
                Ok(outcome)
            }
            PathResult::Removed => Ok(SyncOutcome::Deleted),
            PathResult::Skipped => Ok(SyncOutcome::Skipped),
        }
    }

    // ========================================================================
    // Dispatch paths
    // ========================================================================

    async fn create_path(
        &self,
        payload: &RemotePayload,
        record: &mut SyncRecord,
        creds: &Credentials,
        attempt: u32,
    ) -> PathResult {
        let response = match self
            .remote
            .create_or_replace(creds, record.remote_id.as_str(), payload)
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(record, "create", &e),
        };
        record.last_message = Some(response.body.clone());

        match response.status {
            200 => {
                if let Some(canonical) = canonical_remote_id(&response) {
                    debug!(
                        dataset_id = %record.dataset_id,
                        provisional = %record.remote_id,
                        canonical = %canonical,
                        "Remote service assigned a canonical id"
                    );
                    record.remote_id = canonical;
                }
                record.state = SyncState::UpToDate;
                PathResult::Persist(SyncOutcome::Synced)
            }
            429 => {
                warn!(dataset_id = %record.dataset_id, "Create rate limited");
                self.schedule_retry(&record.dataset_id, attempt).await;
                PathResult::Persist(SyncOutcome::RateLimited)
            }
            status => {
                error!(
                    dataset_id = %record.dataset_id,
                    status,
                    body = %response.body,
                    "Create failed"
                );
                record.state = SyncState::Failed;
                PathResult::Persist(SyncOutcome::Failed)
            }
        }
    }

    async fn update_path(
        &self,
        payload: &RemotePayload,
        record: &mut SyncRecord,
        creds: &Credentials,
        attempt: u32,
    ) -> PathResult {
        if !self.is_update_required(payload, record, creds).await {
            info!(dataset_id = %record.dataset_id, "Remote already current, skipping write");
            return PathResult::Skipped;
        }

        let response = match self
            .remote
            .update(creds, record.remote_id.as_str(), payload)
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(record, "update", &e),
        };
        record.last_message = Some(response.body.clone());

        match response.status {
            200 => {
                record.state = SyncState::UpToDate;
                PathResult::Persist(SyncOutcome::Synced)
            }
            404 => {
                warn!(
                    dataset_id = %record.dataset_id,
                    remote_id = %record.remote_id,
                    "Dataset vanished remotely, creating"
                );
                self.create_path(payload, record, creds, attempt).await
            }
            429 => {
                warn!(dataset_id = %record.dataset_id, "Update rate limited");
                self.schedule_retry(&record.dataset_id, attempt).await;
                PathResult::Persist(SyncOutcome::RateLimited)
            }
            status => {
                error!(
                    dataset_id = %record.dataset_id,
                    status,
                    body = %response.body,
                    "Update failed"
                );
                record.state = SyncState::Failed;
                PathResult::Persist(SyncOutcome::Failed)
            }
        }
    }

    async fn delete_path(
        &self,
        payload: &RemotePayload,
        record: &mut SyncRecord,
        creds: &Credentials,
        attempt: u32,
    ) -> PathResult {
        let response = match self
            .remote
            .delete(creds, record.remote_id.as_str(), payload)
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(record, "delete", &e),
        };
        record.last_message = Some(response.body.clone());

        match response.status {
            // 404 means the mirror is already gone, which is what a delete
            // wants; both outcomes retire the record for good.
            200 | 404 => {
                if let Err(e) = self.records.delete(&record.dataset_id).await {
                    error!(dataset_id = %record.dataset_id, error = %e, "Could not remove sync record");
                    return PathResult::Persist(SyncOutcome::Failed);
                }
                info!(dataset_id = %record.dataset_id, "Sync record removed after remote delete");
                PathResult::Removed
            }
            429 => {
                warn!(dataset_id = %record.dataset_id, "Delete rate limited");
                self.schedule_retry(&record.dataset_id, attempt).await;
                PathResult::Persist(SyncOutcome::RateLimited)
            }
            status => {
                error!(
                    dataset_id = %record.dataset_id,
                    status,
                    body = %response.body,
                    "Delete failed"
                );
                record.state = SyncState::Failed;
                PathResult::Persist(SyncOutcome::Failed)
            }
        }
    }

    // ========================================================================
    // Dirty-check
    // ========================================================================

    /// Decides whether an update write is needed at all
    ///
    /// A failed or non-200 GET never blocks the update: the check only
    /// protects against unnecessary writes.
    async fn is_update_required(
        &self,
        payload: &RemotePayload,
        record: &SyncRecord,
        creds: &Credentials,
    ) -> bool {
        let response = match self.remote.fetch(creds, record.remote_id.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(dataset_id = %record.dataset_id, error = %e, "Dirty-check fetch failed, updating anyway");
                return true;
            }
        };
        if response.status != 200 {
            warn!(
                dataset_id = %record.dataset_id,
                status = response.status,
                "Could not fetch dataset for dirty check"
            );
            return true;
        }
        let Some(remote) = response.json() else {
            return true;
        };
        let new = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(_) => return true,
        };
        payload_changed(&new, &remote)
    }

    // ========================================================================
    // Retry
    // ========================================================================

    /// Re-enqueues a rate-limited sync with an incremented attempt counter
    ///
    /// Once the incremented count exceeds the cap the sync is abandoned
    /// with a log line only; the record keeps its prior state until a new
    /// external trigger arrives.
    async fn schedule_retry(&self, dataset_id: &DatasetId, attempt: u32) {
        let next = attempt + 1;
        if next > self.max_attempts {
            info!(
                dataset_id = %dataset_id,
                max_attempts = self.max_attempts,
                "Max request attempts reached, abandoning"
            );
            return;
        }
        let job = SyncJob {
            dataset_id: dataset_id.clone(),
            attempt: next,
        };
        if let Err(e) = self.queue.enqueue(job).await {
            error!(dataset_id = %dataset_id, error = %e, "Could not re-enqueue rate-limited sync");
        }
    }

    // ========================================================================
    // Collaborator-facing helpers
    // ========================================================================

    /// Validates credentials at configuration-edit time
    ///
    /// Static field validation first, then a live key check against the
    /// remote service. A 401 surfaces as [`CredentialsError::Rejected`];
    /// this is never retried in the background.
    pub async fn verify_credentials(&self, creds: &Credentials) -> Result<()> {
        creds.validate()?;
        if !self
            .remote
            .check_credentials(&creds.owner, &creds.key)
            .await?
        {
            return Err(CredentialsError::Rejected.into());
        }
        Ok(())
    }

    /// Fires the remote service's own resource resync for a dataset
    ///
    /// Fire-and-forget: the result is logged and otherwise ignored.
    pub async fn resync_remote_files(&self, creds: &Credentials, name: &str) {
        match self.remote.trigger_file_sync(creds, name).await {
            Ok(response) => {
                info!(name, status = response.status, body = %response.body, "Remote file resync triggered");
            }
            Err(e) => {
                warn!(name, error = %e, "Remote file resync trigger failed");
            }
        }
    }
}

/// Records a transport-level failure as a failed sync
fn transport_failure(record: &mut SyncRecord, call: &str, error: &anyhow::Error) -> PathResult {
    error!(
        dataset_id = %record.dataset_id,
        call,
        error = format!("{error:#}"),
        "Remote call never completed"
    );
    record.state = SyncState::Failed;
    record.last_message = Some(format!("{error:#}"));
    PathResult::Persist(SyncOutcome::Failed)
}

/// Extracts the canonical remote id from a create response, when present
///
/// The id is the basename of the response's `uri` field.
fn canonical_remote_id(response: &ApiResponse) -> Option<RemoteId> {
    let json = response.json()?;
    let uri = json.get("uri")?.as_str()?;
    let basename = uri.rsplit('/').next()?;
    if basename.is_empty() {
        None
    } else {
        Some(RemoteId::new(basename))
    }
}

/// Shallow, one-directional payload comparison
///
/// A field counts as changed when it is present in the new payload and its
/// value differs from (or is absent in) the remote representation. Fields
/// only the remote side carries never trigger a write.
pub fn payload_changed(new: &Value, remote: &Value) -> bool {
    let Some(fields) = new.as_object() else {
        return new != remote;
    };
    fields
        .iter()
        .any(|(key, value)| remote.get(key) != Some(value))
}
