//! Remote catalog port (driven/secondary port)
//!
//! Interface to the hosted dataset service. The sync engine branches on raw
//! HTTP status codes (200 / 404 / 429), so responses cross this seam as an
//! [`ApiResponse`] rather than being collapsed into errors; transport
//! failures (DNS, connect, TLS) surface as `anyhow::Error` because they are
//! adapter-specific and carry no protocol meaning.

use crate::domain::Credentials;
use crate::payload::RemotePayload;

/// Status and raw body of a remote API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body, stored verbatim as the sync record's diagnostic
    /// message
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parses the body as JSON, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Returns true for HTTP 200
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Port trait for the remote hosted-dataset service
///
/// Implementations attach authentication from the supplied credentials on
/// every call and self-throttle after mutating calls.
#[async_trait::async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// `PUT /datasets/{owner}/{id}` — create or replace a dataset
    async fn create_or_replace(
        &self,
        creds: &Credentials,
        id: &str,
        payload: &RemotePayload,
    ) -> anyhow::Result<ApiResponse>;

    /// `PUT /datasets/{owner}/{name}` — update an existing dataset
    async fn update(
        &self,
        creds: &Credentials,
        name: &str,
        payload: &RemotePayload,
    ) -> anyhow::Result<ApiResponse>;

    /// `DELETE /datasets/{owner}/{id}` — delete a dataset
    async fn delete(
        &self,
        creds: &Credentials,
        id: &str,
        payload: &RemotePayload,
    ) -> anyhow::Result<ApiResponse>;

    /// `GET /datasets/{owner}/{name}` — fetch the current remote
    /// representation (dirty-check and credential validation)
    async fn fetch(&self, creds: &Credentials, name: &str) -> anyhow::Result<ApiResponse>;

    /// `POST /datasets/{owner}/{name}/sync` — trigger the remote service's
    /// own resource resync (fire-and-forget)
    async fn trigger_file_sync(
        &self,
        creds: &Credentials,
        name: &str,
    ) -> anyhow::Result<ApiResponse>;

    /// Validates an owner/key pair with a sentinel GET
    ///
    /// Returns false only on HTTP 401; a 404 proves the key itself was
    /// accepted.
    async fn check_credentials(&self, owner: &str, key: &str) -> anyhow::Result<bool>;
}
