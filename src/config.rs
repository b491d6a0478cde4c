//! Configuration management for the OCSF client
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ocsf.toml)
//! - Environment variables (OCSF__*)
//!
//! ## Example config file (ocsf.toml):
//! ```toml
//! [server]
//! base_url = "https://schema.ocsf.io/"
//! timeout_secs = 30
//!
//! [fetch]
//! profiles = true
//! extensions = false
//! cache_versions = false
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Public OCSF schema server
pub const DEFAULT_BASE_URL: &str = "https://schema.ocsf.io/";

/// Main configuration for the OCSF client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// What `get_schema` fetches
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root URL of the schema server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Fetch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Attach profiles to every fetched schema
    #[serde(default)]
    pub profiles: bool,

    /// Attach extensions to every fetched schema
    #[serde(default)]
    pub extensions: bool,

    /// Reuse the first versions listing for the client's lifetime
    #[serde(default)]
    pub cache_versions: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Request timeout, `None` when `timeout_secs` is 0
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl ClientConfig {
    /// Default configuration pointed at another server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.server.base_url = base_url.into();
        config
    }

    pub fn fetch_profiles(mut self, enabled: bool) -> Self {
        self.fetch.profiles = enabled;
        self
    }

    pub fn fetch_extensions(mut self, enabled: bool) -> Self {
        self.fetch.extensions = enabled;
        self
    }

    pub fn cache_versions(mut self, enabled: bool) -> Self {
        self.fetch.cache_versions = enabled;
        self
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["ocsf.toml", ".ocsf.toml", "config/ocsf.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("io", "ocsf", "ocsf-api") {
            let xdg_config = config_dir.config_dir().join("ocsf.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // OCSF__FETCH__PROFILES=true
        builder = builder.add_source(
            Environment::with_prefix("OCSF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
