//! Job dispatch shim
//!
//! Bridges host-application events to background sync execution:
//!
//! - [`TokioJobQueue`] backs the [`JobQueue`] port with an unbounded tokio
//!   mpsc channel
//! - [`SyncWorker`] drains the channel and runs each job through the engine
//! - [`SyncDispatcher`] is what lifecycle hooks and admin actions call:
//!   `notify_dataset` for a single dataset event, `resync_organization` to
//!   push everything an organization owns
//!
//! Jobs carry only the dataset id and attempt counter; all dataset content
//! is re-read at execution time.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use hubsync_core::domain::{DatasetId, OrgId};
use hubsync_core::ports::{JobQueue, LocalCatalog, SyncJob, SyncRecordStore};

use crate::engine::SyncEngine;

/// Unbounded in-process job queue
///
/// Cloneable sender half of a tokio mpsc channel; the receiver half goes to
/// a [`SyncWorker`].
pub struct TokioJobQueue {
    sender: mpsc::UnboundedSender<SyncJob>,
}

impl TokioJobQueue {
    /// Creates the queue and the receiver its worker will drain
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SyncJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait::async_trait]
impl JobQueue for TokioJobQueue {
    async fn enqueue(&self, job: SyncJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| anyhow!("job queue receiver is gone"))
    }
}

/// Background worker executing queued syncs one at a time
///
/// Serial execution is what spaces requests out; the remote client's
/// post-call delay only works because no two jobs overlap.
pub struct SyncWorker {
    engine: Arc<SyncEngine>,
}

impl SyncWorker {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    /// Drains the channel until every sender is dropped
    pub async fn run(self, mut jobs: mpsc::UnboundedReceiver<SyncJob>) {
        info!("Sync worker started");
        while let Some(job) = jobs.recv().await {
            self.process(job).await;
        }
        info!("Sync worker stopped, job queue closed");
    }

    /// Runs a single job; failures are logged, never propagated
    pub async fn process(&self, job: SyncJob) {
        debug!(dataset_id = %job.dataset_id, attempt = job.attempt, "Processing sync job");
        match self.engine.notify(&job.dataset_id, job.attempt).await {
            Ok(dispatched) => {
                debug!(dataset_id = %job.dataset_id, dispatched, "Sync job finished");
            }
            Err(e) => {
                error!(dataset_id = %job.dataset_id, error = format!("{e:#}"), "Sync job failed");
            }
        }
    }
}

/// Entry point for host-application events
pub struct SyncDispatcher {
    queue: Arc<dyn JobQueue>,
    catalog: Arc<dyn LocalCatalog>,
    records: Arc<dyn SyncRecordStore>,
}

impl SyncDispatcher {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        catalog: Arc<dyn LocalCatalog>,
        records: Arc<dyn SyncRecordStore>,
    ) -> Self {
        Self {
            queue,
            catalog,
            records,
        }
    }

    /// Schedules a sync for one dataset, first attempt
    ///
    /// Called from create/update/delete lifecycle hooks. Always enqueues;
    /// skip decisions belong to the engine, which sees fresher state by the
    /// time the job runs.
    pub async fn notify_dataset(&self, dataset_id: &DatasetId) -> Result<()> {
        debug!(dataset_id = %dataset_id, "Scheduling sync");
        self.queue.enqueue(SyncJob::new(dataset_id.clone())).await
    }

    /// Schedules a fresh sync for every dataset an organization owns
    ///
    /// Existing sync records are reset to pending first so a crash
    /// mid-resync is visible in the state counts.
    pub async fn resync_organization(&self, org: &OrgId) -> Result<usize> {
        let dataset_ids = self.catalog.dataset_ids_for_org(org).await?;
        self.records.mark_all_pending(&dataset_ids).await?;
        for dataset_id in &dataset_ids {
            self.queue.enqueue(SyncJob::new(dataset_id.clone())).await?;
        }
        info!(org = %org, count = dataset_ids.len(), "Organization resync scheduled");
        Ok(dataset_ids.len())
    }
}
