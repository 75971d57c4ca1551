//! hubsync core — domain model, ports, and payload building
//!
//! This crate holds everything the sync engine and its adapters share:
//!
//! - [`domain`] — identifiers, credentials, the immutable dataset snapshot,
//!   and the per-dataset [`SyncRecord`](domain::SyncRecord)
//! - [`ports`] — the traits adapters implement (remote catalog, record
//!   store, local catalog, job queue)
//! - [`payload`] — the pure transformation from a dataset snapshot into the
//!   remote service's payload shape
//! - [`config`] — typed YAML configuration with working defaults
//!
//! The crate performs no I/O; HTTP lives in `hubsync-remote`, SQLite in
//! `hubsync-store`, and the state machine in `hubsync-engine`.

pub mod config;
pub mod domain;
pub mod payload;
pub mod ports;

pub use config::Config;
pub use payload::{build_payload, RemotePayload, SiteContext};
