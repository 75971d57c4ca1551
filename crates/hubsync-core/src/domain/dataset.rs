//! Dataset snapshot types
//!
//! A [`DatasetSnapshot`] is an immutable, fully-resolved view of a local
//! dataset fetched at sync time. It is never cached across sync attempts;
//! the engine always re-reads it so the payload reflects the latest local
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{DatasetId, OrgId};

/// Lifecycle state of a local dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetState {
    /// Published and visible
    Active,
    /// Still being authored; never synced
    Draft,
    /// Deleted locally; the remote mirror must be removed
    Deleted,
}

/// A single resource (file) attached to a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Download URL of the resource
    pub url: String,
    /// Display name, may or may not carry an extension
    pub name: String,
    /// Declared format (e.g. "CSV"), takes precedence for extension
    /// resolution when present
    pub format: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

/// Immutable view of a local dataset at sync time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Host-application id of the dataset
    pub id: DatasetId,
    /// Owning organization, if any
    pub org: Option<OrgId>,
    /// URL-safe machine name (slug) of the dataset
    pub name: String,
    /// Human-readable display title
    pub title: String,
    /// Long-form notes / description
    pub notes: String,
    /// Dataset kind; only the plain "dataset" kind is syncable
    pub kind: String,
    /// Lifecycle state
    pub state: DatasetState,
    /// Whether the dataset is private
    pub private: bool,
    /// License identifier (e.g. "cc-by"), if declared
    pub license_id: Option<String>,
    /// Last local modification time
    pub metadata_modified: DateTime<Utc>,
    /// Tag names, raw as entered by users
    pub tags: Vec<String>,
    /// Attached resources
    pub resources: Vec<Resource>,
}

impl DatasetSnapshot {
    /// Returns true for the dataset kind the sync engine handles
    #[must_use]
    pub fn is_syncable_kind(&self) -> bool {
        self.kind == "dataset"
    }
}
