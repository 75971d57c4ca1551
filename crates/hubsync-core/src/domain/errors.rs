//! Domain error types

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown sync state string read back from storage
    #[error("Unknown sync state: {0}")]
    UnknownState(String),
}

/// Errors raised when validating organization credentials
///
/// These surface synchronously at configuration-edit time; they are never
/// retried in the background.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Integration is enabled but no remote account owner was provided
    #[error("owner is required when integration is enabled")]
    MissingOwner,

    /// Integration is enabled but no API key was provided
    #[error("key is required when integration is enabled")]
    MissingKey,

    /// Show-links was enabled without a complete set of credentials
    #[error("show links is available only if credentials are provided")]
    ShowLinksRequiresCredentials,

    /// The remote service rejected the key (HTTP 401)
    #[error("incorrect key")]
    Rejected,
}
