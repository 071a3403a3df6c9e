//! Client configuration
//!
//! Endpoint and crawl defaults, loadable from a YAML file. Explicit
//! [`CrawlOptions`](crate::crawler::CrawlOptions) override these per run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default GraphQL endpoint for the Arweave search gateway
pub const DEFAULT_ENDPOINT: &str = "https://arweave-search.goldsky.com/graphql";

/// Configuration for [`GraphqlClient`](crate::client::GraphqlClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub graphql_endpoint: String,

    /// Maximum attempts per page request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: f64,

    /// Cooperative sleep between pages, in seconds
    #[serde(default = "default_batch_sleep")]
    pub batch_sleep_secs: f64,

    /// Page size for the first request
    #[serde(default = "default_initial_batch_size")]
    pub initial_batch_size: usize,

    /// Upper bound on the requested page size (the crawler discovers the
    /// server's real ceiling below this)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Path of the append-only error-cursor log
    #[serde(default = "default_error_log")]
    pub error_log_path: String,

    /// Request timeout, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_batch_sleep() -> f64 {
    1.0
}

fn default_initial_batch_size() -> usize {
    100
}

fn default_max_batch_size() -> usize {
    500
}

fn default_error_log() -> String {
    "error_cursors.log".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            graphql_endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            batch_sleep_secs: default_batch_sleep(),
            initial_batch_size: default_initial_batch_size(),
            max_batch_size: default_max_batch_size(),
            error_log_path: default_error_log(),
            timeout_secs: default_timeout(),
            headers: HashMap::new(),
        }
    }
}

impl HarvestConfig {
    /// Create a config with the default gateway endpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.graphql_endpoint.is_empty() {
            return Err(Error::config("graphql_endpoint must not be empty"));
        }
        url::Url::parse(&self.graphql_endpoint)?;
        if self.initial_batch_size == 0 {
            return Err(Error::config("initial_batch_size must be positive"));
        }
        if self.max_batch_size < self.initial_batch_size {
            return Err(Error::config(
                "max_batch_size must be >= initial_batch_size",
            ));
        }
        Ok(())
    }

    /// Retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs)
    }

    /// Inter-page sleep as a Duration
    pub fn batch_sleep(&self) -> Duration {
        Duration::from_secs_f64(self.batch_sleep_secs)
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Override the endpoint (used by tests against a mock server)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graphql_endpoint = endpoint.into();
        self
    }

    /// Override the error-cursor log path
    #[must_use]
    pub fn with_error_log(mut self, path: impl Into<String>) -> Self {
        self.error_log_path = path.into();
        self
    }
}
