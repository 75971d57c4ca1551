//! Shared in-memory port implementations for engine tests
//!
//! `ScriptedRemote` replays canned [`ApiResponse`]s and records every call
//! in order, so tests can assert on the exact remote traffic a sync
//! produced. `MemoryRecordStore` and `RecordingQueue` are plain
//! mutex-guarded maps/vectors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::Utc;

use hubsync_core::config::Config;
use hubsync_core::domain::{
    Credentials, DatasetId, DatasetSnapshot, DatasetState, OrgId, SyncRecord, SyncState,
};
use hubsync_core::payload::RemotePayload;
use hubsync_core::ports::{
    ApiResponse, JobQueue, LocalCatalog, RemoteCatalog, SyncJob, SyncRecordStore,
};

use crate::engine::SyncEngine;

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.site.url = "http://localhost:5000".to_string();
    config
}

pub(crate) fn test_creds() -> Credentials {
    Credentials::new("acme", "test-key")
}

pub(crate) fn test_snapshot() -> DatasetSnapshot {
    DatasetSnapshot {
        id: DatasetId::new("pkg-001"),
        org: Some(OrgId::new("org-001")),
        name: "rivers-2020".to_string(),
        title: "Rivers 2020".to_string(),
        notes: "Water quality measurements.".to_string(),
        kind: "dataset".to_string(),
        state: DatasetState::Active,
        private: false,
        license_id: Some("cc-by".to_string()),
        metadata_modified: Utc::now(),
        tags: vec!["water".to_string(), "rivers".to_string()],
        resources: vec![],
    }
}

/// Wires an engine over the standard set of test doubles
pub(crate) fn test_engine(
    catalog: StubCatalog,
    config: Config,
) -> (
    SyncEngine,
    Arc<ScriptedRemote>,
    Arc<MemoryRecordStore>,
    Arc<RecordingQueue>,
) {
    let remote = Arc::new(ScriptedRemote::new());
    let records = Arc::new(MemoryRecordStore::new());
    let queue = Arc::new(RecordingQueue::new());
    let engine = SyncEngine::new(
        Arc::new(catalog),
        records.clone(),
        remote.clone(),
        queue.clone(),
        &config,
    );
    (engine, remote, records, queue)
}

// ============================================================================
// Local catalog stub
// ============================================================================

/// Serves one fixed snapshot (and one set of credentials) for any id
pub(crate) struct StubCatalog {
    snapshot: Option<DatasetSnapshot>,
    creds: Option<Credentials>,
}

impl StubCatalog {
    pub(crate) fn new(snapshot: DatasetSnapshot, creds: Option<Credentials>) -> Self {
        Self {
            snapshot: Some(snapshot),
            creds,
        }
    }

    /// A catalog with no datasets at all
    pub(crate) fn empty() -> Self {
        Self {
            snapshot: None,
            creds: Some(test_creds()),
        }
    }
}

#[async_trait::async_trait]
impl LocalCatalog for StubCatalog {
    async fn snapshot(&self, _dataset_id: &DatasetId) -> Result<Option<DatasetSnapshot>> {
        Ok(self.snapshot.clone())
    }

    async fn credentials_for(&self, _org: &OrgId) -> Result<Option<Credentials>> {
        Ok(self.creds.clone())
    }

    async fn dataset_ids_for_org(&self, _org: &OrgId) -> Result<Vec<DatasetId>> {
        Ok(self.snapshot.iter().map(|s| s.id.clone()).collect())
    }
}

// ============================================================================
// Scripted remote
// ============================================================================

/// One remote call as the engine issued it, with the target id
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RemoteCall {
    Create(String),
    Update(String),
    Delete(String),
    Fetch(String),
    FileSync(String),
    CheckCredentials,
}

/// Remote catalog double replaying canned responses
///
/// Unscripted calls answer `200 {}`; a scripted response is replayed for
/// every call of its kind.
pub(crate) struct ScriptedRemote {
    calls: Mutex<Vec<RemoteCall>>,
    responses: Mutex<HashMap<&'static str, ApiResponse>>,
    create_error: Mutex<Option<String>>,
    credentials_ok: Mutex<bool>,
}

impl ScriptedRemote {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            create_error: Mutex::new(None),
            credentials_ok: Mutex::new(true),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn respond_create(&self, response: ApiResponse) {
        self.responses.lock().unwrap().insert("create", response);
    }

    pub(crate) fn respond_update(&self, response: ApiResponse) {
        self.responses.lock().unwrap().insert("update", response);
    }

    pub(crate) fn respond_delete(&self, response: ApiResponse) {
        self.responses.lock().unwrap().insert("delete", response);
    }

    pub(crate) fn respond_fetch(&self, response: ApiResponse) {
        self.responses.lock().unwrap().insert("fetch", response);
    }

    /// Makes create fail at the transport level with the given message
    pub(crate) fn fail_create(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn set_credentials_ok(&self, ok: bool) {
        *self.credentials_ok.lock().unwrap() = ok;
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn response_for(&self, kind: &str) -> ApiResponse {
        self.responses
            .lock()
            .unwrap()
            .get(kind)
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(200, "{}"))
    }
}

#[async_trait::async_trait]
impl RemoteCatalog for ScriptedRemote {
    async fn create_or_replace(
        &self,
        _creds: &Credentials,
        id: &str,
        _payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        self.record(RemoteCall::Create(id.to_string()));
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        Ok(self.response_for("create"))
    }

    async fn update(
        &self,
        _creds: &Credentials,
        name: &str,
        _payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        self.record(RemoteCall::Update(name.to_string()));
        Ok(self.response_for("update"))
    }

    async fn delete(
        &self,
        _creds: &Credentials,
        id: &str,
        _payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        self.record(RemoteCall::Delete(id.to_string()));
        Ok(self.response_for("delete"))
    }

    async fn fetch(&self, _creds: &Credentials, name: &str) -> Result<ApiResponse> {
        self.record(RemoteCall::Fetch(name.to_string()));
        Ok(self.response_for("fetch"))
    }

    async fn trigger_file_sync(&self, _creds: &Credentials, name: &str) -> Result<ApiResponse> {
        self.record(RemoteCall::FileSync(name.to_string()));
        Ok(self.response_for("file_sync"))
    }

    async fn check_credentials(&self, _owner: &str, _key: &str) -> Result<bool> {
        self.record(RemoteCall::CheckCredentials);
        Ok(*self.credentials_ok.lock().unwrap())
    }
}

// ============================================================================
// In-memory record store
// ============================================================================

pub(crate) struct MemoryRecordStore {
    records: Mutex<HashMap<String, SyncRecord>>,
    fail_next_upsert: Mutex<bool>,
}

impl MemoryRecordStore {
    pub(crate) fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_next_upsert: Mutex::new(false),
        }
    }

    /// Pre-loads a record, as if a previous sync had stored it
    pub(crate) fn seed(&self, record: SyncRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.dataset_id.as_str().to_string(), record);
    }

    pub(crate) fn get_sync(&self, dataset_id: &str) -> Option<SyncRecord> {
        self.records.lock().unwrap().get(dataset_id).cloned()
    }

    /// The next upsert fails without storing anything
    pub(crate) fn fail_next_upsert(&self) {
        *self.fail_next_upsert.lock().unwrap() = true;
    }
}

#[async_trait::async_trait]
impl SyncRecordStore for MemoryRecordStore {
    async fn get(&self, dataset_id: &DatasetId) -> Result<Option<SyncRecord>> {
        Ok(self.records.lock().unwrap().get(dataset_id.as_str()).cloned())
    }

    async fn upsert(&self, record: &SyncRecord) -> Result<()> {
        let mut fail = self.fail_next_upsert.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(anyhow!("record store unavailable"));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.dataset_id.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, dataset_id: &DatasetId) -> Result<()> {
        self.records.lock().unwrap().remove(dataset_id.as_str());
        Ok(())
    }

    async fn list_by_state(&self, state: SyncState) -> Result<Vec<SyncRecord>> {
        let mut matching: Vec<SyncRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.state == state)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.dataset_id.as_str().cmp(b.dataset_id.as_str()));
        Ok(matching)
    }

    async fn count_by_state(&self) -> Result<HashMap<String, u64>> {
        let mut counts = HashMap::new();
        for record in self.records.lock().unwrap().values() {
            *counts.entry(record.state.name().to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn mark_all_pending(&self, dataset_ids: &[DatasetId]) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        for dataset_id in dataset_ids {
            if let Some(record) = records.get_mut(dataset_id.as_str()) {
                record.state = SyncState::Pending;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Recording queue
// ============================================================================

pub(crate) struct RecordingQueue {
    jobs: Mutex<Vec<SyncJob>>,
}

impl RecordingQueue {
    pub(crate) fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn jobs(&self) -> Vec<SyncJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job: SyncJob) -> Result<()> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}
