//! Organization credentials for the remote catalog
//!
//! One set of credentials exists per organization. They are created on the
//! first admin edit, updated on subsequent edits, and deleted with the
//! organization. Static validation happens here; the live key check (a
//! sentinel GET against the remote API) belongs to the remote client.

use serde::{Deserialize, Serialize};

use super::errors::CredentialsError;

/// Per-organization remote catalog credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Remote account that owns the mirrored datasets
    pub owner: String,
    /// API key presented as a bearer token
    pub key: String,
    /// Whether background synchronization is enabled for this organization
    pub integration_enabled: bool,
    /// Whether public links to the remote mirror are shown in the host UI
    pub show_links_enabled: bool,
}

impl Credentials {
    /// Creates credentials with integration enabled and links hidden
    pub fn new(owner: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            key: key.into(),
            integration_enabled: true,
            show_links_enabled: false,
        }
    }

    /// Static validation of the credential fields
    ///
    /// Integration requires a non-empty owner and key; showing links
    /// requires both as well. The live key validation against the remote
    /// service is a separate step performed by the caller.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.integration_enabled {
            if self.owner.is_empty() {
                return Err(CredentialsError::MissingOwner);
            }
            if self.key.is_empty() {
                return Err(CredentialsError::MissingKey);
            }
        }
        if self.show_links_enabled && (self.owner.is_empty() || self.key.is_empty()) {
            return Err(CredentialsError::ShowLinksRequiresCredentials);
        }
        Ok(())
    }
}
