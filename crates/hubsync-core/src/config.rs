//! Configuration module for hubsync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults. Everything is parsed and
//! validated once at process startup; nothing falls back to per-call string
//! coercion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for hubsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub site: SiteConfig,
    pub sync: SyncConfig,
}

/// Remote catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote dataset API.
    pub api_root: String,
    /// Base URL of the remote service's browsable site (public links).
    pub web_root: String,
}

/// Host application settings used when rendering canonical links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the host application.
    pub url: String,
}

/// Synchronization behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds to sleep after every mutating remote call (self-throttle).
    /// Zero or negative disables the delay.
    pub request_delay_secs: f64,
    /// Maximum number of attempts for a rate-limited sync before it is
    /// abandoned.
    pub max_request_attempts: u32,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/hubsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("hubsync")
            .join("config.yaml")
    }

    /// Startup validation of the loaded values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.remote.api_root.is_empty() {
            anyhow::bail!("remote.api_root must not be empty");
        }
        if self.remote.web_root.is_empty() {
            anyhow::bail!("remote.web_root must not be empty");
        }
        if self.sync.max_request_attempts == 0 {
            anyhow::bail!("sync.max_request_attempts must be at least 1");
        }
        Ok(())
    }

    /// Post-call throttle as a [`Duration`]; `None` when disabled.
    pub fn request_delay(&self) -> Option<Duration> {
        if self.sync.request_delay_secs > 0.0 {
            Some(Duration::from_secs_f64(self.sync.request_delay_secs))
        } else {
            None
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_root: "https://api.data.world/v0".to_string(),
            web_root: "https://data.world".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 1.0,
            max_request_attempts: 10,
        }
    }
}
