//! Ports (interfaces) between the sync core and its adapters
//!
//! Driven ports: [`RemoteCatalog`] (the hosted dataset service),
//! [`SyncRecordStore`] (persisted sync state), [`LocalCatalog`] (the host
//! application's read contract). The [`JobQueue`] port is the seam the
//! dispatch shim and the retry path push work through.

pub mod job_queue;
pub mod local_catalog;
pub mod record_store;
pub mod remote_catalog;

pub use job_queue::{JobQueue, SyncJob};
pub use local_catalog::LocalCatalog;
pub use record_store::SyncRecordStore;
pub use remote_catalog::{ApiResponse, RemoteCatalog};
