//! Client configuration
//!
//! A [`Config`] is consumed by each service client. It can be built in code,
//! read from a YAML file, or picked up from the environment.

use crate::error::{Error, Result};
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the service endpoint
pub const ENV_ENDPOINT: &str = "PANDORA_ENDPOINT";
/// Environment variable holding the access key
pub const ENV_ACCESS_KEY: &str = "PANDORA_ACCESS_KEY";
/// Environment variable holding the secret key
pub const ENV_SECRET_KEY: &str = "PANDORA_SECRET_KEY";

/// Default pipeline service endpoint
pub const DEFAULT_PIPELINE_ENDPOINT: &str = "https://pipeline.qiniu.com";
/// Default log storage endpoint
pub const DEFAULT_LOGDB_ENDPOINT: &str = "https://logdb.qiniu.com";

/// Service client configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL, e.g. `https://pipeline.qiniu.com` (no trailing slash)
    #[serde(default)]
    pub endpoint: String,

    /// Long-lived access key; empty when only scoped tokens are used
    #[serde(default)]
    pub access_key: String,

    /// Secret key paired with `access_key`
    #[serde(default)]
    pub secret_key: String,

    /// TCP connect timeout in seconds
    #[serde(default = "default_dial_timeout_secs")]
    pub dial_timeout_secs: u64,

    /// Response timeout in seconds
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,

    /// Log level used by the CLI subscriber
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_dial_timeout_secs() -> u64 {
    30
}

fn default_response_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            dial_timeout_secs: default_dial_timeout_secs(),
            response_timeout_secs: default_response_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Create an empty config with default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Read endpoint and keys from `PANDORA_*` environment variables
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            endpoint: var(ENV_ENDPOINT),
            access_key: var(ENV_ACCESS_KEY),
            secret_key: var(ENV_SECRET_KEY),
            ..Self::default()
        }
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_access_key_secret_key(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = access_key.into();
        self.secret_key = secret_key.into();
        self
    }

    #[must_use]
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    /// Whether a key pair is available for request signing
    pub fn has_credentials(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    /// Check the endpoint shape
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(Error::config(
                "endpoint should start with 'http://' or 'https://'",
            ));
        }
        if self.endpoint.ends_with('/') {
            return Err(Error::config("endpoint should not end with '/'"));
        }
        url::Url::parse(&self.endpoint)?;
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("dial_timeout_secs", &self.dial_timeout_secs)
            .field("response_timeout_secs", &self.response_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}
