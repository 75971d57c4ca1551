//! Local catalog port (driven/secondary port)
//!
//! Read contract over the host application's own store. The sync engine
//! never caches what it reads here: a snapshot is fetched fresh at the top
//! of every sync attempt so the payload reflects the latest local state.

use crate::domain::{Credentials, DatasetId, DatasetSnapshot, OrgId};

/// Port trait for reading local datasets and organization credentials
#[async_trait::async_trait]
pub trait LocalCatalog: Send + Sync {
    /// Fetches the authoritative snapshot of a dataset
    ///
    /// Returns `None` when the dataset no longer exists at all (a sync job
    /// may race a hard purge).
    async fn snapshot(&self, dataset_id: &DatasetId) -> anyhow::Result<Option<DatasetSnapshot>>;

    /// Fetches the remote-catalog credentials of an organization
    async fn credentials_for(&self, org: &OrgId) -> anyhow::Result<Option<Credentials>>;

    /// Lists every dataset owned by an organization, for bulk resync
    async fn dataset_ids_for_org(&self, org: &OrgId) -> anyhow::Result<Vec<DatasetId>>;
}
