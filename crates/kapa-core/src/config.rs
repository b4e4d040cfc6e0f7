//! Configuration management for kapa
//!
//! Connection settings for the Kapacitor instance that hosts alert tasks.
//! Loaded from `.kapa/config.toml`; every field has a default so a missing
//! file or a partial one is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{KapaError, Result};

const CONFIG_DIR: &str = ".kapa";
const CONFIG_FILE: &str = "config.toml";

/// Top-level kapa configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KapaConfig {
    /// Kapacitor connection
    #[serde(default)]
    pub kapacitor: KapacitorConfig,
}

/// Kapacitor connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KapacitorConfig {
    /// Base URL of the Kapacitor HTTP API
    #[serde(default = "default_url")]
    pub url: String,

    /// Username for basic auth; no auth is attempted when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password sent alongside the username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Tasks fetched per list request
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

// Default value providers
fn default_url() -> String {
    "http://localhost:9092".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

impl KapacitorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Username/password pair, only when a username is set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match self.username.as_deref() {
            Some(user) if !user.is_empty() => {
                Some((user, self.password.as_deref().unwrap_or_default()))
            }
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings no request could succeed with
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(KapaError::Config(format!(
                "Kapacitor URL must be http(s): {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(KapaError::Config("timeout_secs must be positive".to_string()));
        }
        if self.page_size == 0 {
            return Err(KapaError::Config("page_size must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for KapacitorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl KapaConfig {
    /// Load configuration from `.kapa/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content).map_err(|e| {
                KapaError::Config(format!("Failed to parse config file: {}", e))
            })?;
            tracing::debug!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.kapa/config.toml`
    pub fn write_default(root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            KapaError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}
