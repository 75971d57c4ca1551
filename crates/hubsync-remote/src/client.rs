//! Remote dataset catalog client
//!
//! Thin authenticated wrapper over the hosted dataset service's HTTP API.
//! Every call attaches `Authorization: Bearer <key>` and a versioned
//! user-agent. Mutating calls (create/update/delete) sleep for a
//! configurable delay after receiving the response to self-throttle against
//! rate limits; the delay blocks the calling job, it is not a scheduled
//! retry.
//!
//! Responses come back as [`ApiResponse`] with the raw status and body —
//! the sync engine, not this client, decides what a 404 or a 429 means.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, info, warn};

use hubsync_core::config::Config;
use hubsync_core::domain::Credentials;
use hubsync_core::payload::RemotePayload;
use hubsync_core::ports::{ApiResponse, RemoteCatalog};

/// User-agent identifying this integration and its version
const USER_AGENT: &str = concat!("hubsync/", env!("CARGO_PKG_VERSION"));

/// Dataset name guaranteed not to exist, used for credential validation
const SENTINEL_DATASET: &str = "definitely-fake-dataset-name";

/// HTTP client for the remote dataset catalog
pub struct RemoteClient {
    /// The underlying HTTP client
    http: Client,
    /// Base URL of the dataset API
    api_root: String,
    /// Base URL of the browsable site, used for public links
    web_root: String,
    /// Post-response sleep applied to mutating calls; `None` disables it
    request_delay: Option<Duration>,
}

impl RemoteClient {
    /// Creates a client from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_base_urls(&config.remote.api_root, &config.remote.web_root)
            .with_request_delay(config.request_delay())
    }

    /// Creates a client against custom base URLs (useful for testing)
    pub fn with_base_urls(api_root: impl Into<String>, web_root: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            http,
            api_root: trim_slash(api_root.into()),
            web_root: trim_slash(web_root.into()),
            request_delay: Some(Duration::from_secs(1)),
        }
    }

    /// Sets the post-call throttle; `None` disables it
    pub fn with_request_delay(mut self, delay: Option<Duration>) -> Self {
        self.request_delay = delay;
        self
    }

    /// Public browsable URL of an owner, or of one dataset when `dataset`
    /// is given
    pub fn generate_link(&self, owner: &str, dataset: Option<&str>) -> String {
        let mut parts = vec![self.web_root.as_str(), owner];
        if let Some(name) = dataset {
            parts.push(name);
        }
        parts.join("/")
    }

    /// Creates an authenticated request builder for the given method and path
    fn request(&self, method: Method, path: &str, key: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_root, path);
        self.http
            .request(method, &url)
            .bearer_auth(key)
            .header("Content-Type", "application/json")
    }

    /// Reads a response into an [`ApiResponse`], keeping the raw body
    async fn read_response(response: Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok(ApiResponse::new(status, body))
    }

    /// Sleeps for the configured request delay, if enabled
    ///
    /// Applied after every mutating call; occupies the calling job on
    /// purpose so a single worker cannot hammer the remote service.
    async fn throttle(&self) {
        if let Some(delay) = self.request_delay {
            debug!(delay_ms = delay.as_millis() as u64, "Throttling after mutating call");
            tokio::time::sleep(delay).await;
        }
    }

    async fn put(
        &self,
        creds: &Credentials,
        path: &str,
        payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        let response = self
            .request(Method::PUT, path, &creds.key)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("PUT {path} failed to send"))?;
        let api_response = Self::read_response(response).await?;
        self.throttle().await;
        Ok(api_response)
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[async_trait::async_trait]
impl RemoteCatalog for RemoteClient {
    async fn create_or_replace(
        &self,
        creds: &Credentials,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        let path = format!("/datasets/{}/{}", creds.owner, id);
        let response = self.put(creds, &path, payload).await?;
        if response.is_ok() {
            info!(id, "Successfully created");
        } else {
            warn!(id, status = response.status, body = %response.body, "Create dataset");
        }
        Ok(response)
    }

    async fn update(
        &self,
        creds: &Credentials,
        name: &str,
        payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        let path = format!("/datasets/{}/{}", creds.owner, name);
        let response = self.put(creds, &path, payload).await?;
        if response.is_ok() {
            info!(name, "Successfully updated");
        } else {
            warn!(name, status = response.status, body = %response.body, "Update dataset");
        }
        Ok(response)
    }

    async fn delete(
        &self,
        creds: &Credentials,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<ApiResponse> {
        let path = format!("/datasets/{}/{}", creds.owner, id);
        let response = self
            .request(Method::DELETE, &path, &creds.key)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("DELETE {path} failed to send"))?;
        let api_response = Self::read_response(response).await?;
        self.throttle().await;
        if api_response.is_ok() {
            info!(id, "Successfully deleted");
        } else {
            warn!(id, status = api_response.status, body = %api_response.body, "Delete dataset");
        }
        Ok(api_response)
    }

    async fn fetch(&self, creds: &Credentials, name: &str) -> Result<ApiResponse> {
        let path = format!("/datasets/{}/{}", creds.owner, name);
        let response = self
            .request(Method::GET, &path, &creds.key)
            .send()
            .await
            .with_context(|| format!("GET {path} failed to send"))?;
        Self::read_response(response).await
    }

    async fn trigger_file_sync(&self, creds: &Credentials, name: &str) -> Result<ApiResponse> {
        let path = format!("/datasets/{}/{}/sync", creds.owner, name);
        let response = self
            .request(Method::POST, &path, &creds.key)
            .send()
            .await
            .with_context(|| format!("POST {path} failed to send"))?;
        Self::read_response(response).await
    }

    async fn check_credentials(&self, owner: &str, key: &str) -> Result<bool> {
        let path = format!("/datasets/{owner}/{SENTINEL_DATASET}");
        let response = self
            .request(Method::GET, &path, key)
            .send()
            .await
            .context("Credential check failed to send")?;
        let status = response.status().as_u16();
        debug!(owner, status, "Credential check response");
        // Anything but unauthorized proves the key was accepted; a 404 for
        // the sentinel name is the expected success signal.
        Ok(status != 401)
    }
}
