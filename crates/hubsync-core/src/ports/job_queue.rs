//! Job queue port (driving/primary seam)
//!
//! The engine re-enqueues rate-limited syncs through this port and the
//! dispatch shim feeds lifecycle events into it. Delivery is at-least-once;
//! consumers must tolerate duplicate jobs.

use serde::{Deserialize, Serialize};

use crate::domain::DatasetId;

/// A scheduled sync for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    /// Dataset to synchronize
    pub dataset_id: DatasetId,
    /// How many times this sync has been attempted already
    pub attempt: u32,
}

impl SyncJob {
    /// A first-attempt job, as enqueued by lifecycle events and bulk resync
    pub fn new(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            attempt: 0,
        }
    }
}

/// Port trait for scheduling asynchronous sync execution
#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a job for asynchronous execution
    async fn enqueue(&self, job: SyncJob) -> anyhow::Result<()>;
}
