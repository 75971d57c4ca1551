//! hubsync engine — the synchronization state machine
//!
//! Reconciles locally-managed dataset records with their remote mirror:
//!
//! - [`engine::SyncEngine`] decides whether a remote dataset must be
//!   created, updated, or deleted, dirty-checks before updates, and commits
//!   the outcome to the sync-record store
//! - [`dispatch`] is the job shim: a tokio mpsc queue, a worker loop, and
//!   the entry points lifecycle events and bulk resyncs go through
//!
//! Delivery of sync triggers is at-least-once and unordered; the engine
//! tolerates duplicates through idempotent create-or-replace semantics and
//! the pre-update dirty-check, not through locking.

pub mod dispatch;
pub mod engine;

pub use dispatch::{SyncDispatcher, SyncWorker, TokioJobQueue};
pub use engine::{SyncEngine, SyncOutcome};

#[cfg(test)]
pub(crate) mod testing;
