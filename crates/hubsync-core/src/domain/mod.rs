//! Domain model for hubsync
//!
//! Pure data types shared by every crate in the workspace: identifiers,
//! organization credentials, the immutable dataset snapshot, and the
//! per-dataset sync record.

pub mod credentials;
pub mod dataset;
pub mod errors;
pub mod newtypes;
pub mod sync_record;

pub use credentials::Credentials;
pub use dataset::{DatasetSnapshot, DatasetState, Resource};
pub use errors::{CredentialsError, DomainError};
pub use newtypes::{DatasetId, OrgId, RemoteId};
pub use sync_record::{SyncRecord, SyncState};
