//! Store connection configuration.

use crate::error::{ElastiqError, Result};
use std::time::Duration;

/// Environment variable holding comma-separated node URLs.
pub const ENV_URL: &str = "ELASTIQ_URL";
/// Environment variable holding the basic auth username.
pub const ENV_USERNAME: &str = "ELASTIQ_USERNAME";
/// Environment variable holding the basic auth password.
pub const ENV_PASSWORD: &str = "ELASTIQ_PASSWORD";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ELASTIQ_TIMEOUT_SECS";

/// Store connection configuration.
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Node URL(s).
    pub urls: Vec<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Maximum number of retries.
    pub max_retries: u32,
}

impl ElasticConfig {
    /// Create a new configuration with a single URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            password: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Create configuration with multiple URLs for a cluster.
    pub fn cluster(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Self::new("")
        }
    }

    /// Load configuration from `ELASTIQ_*` environment variables.
    ///
    /// `ELASTIQ_URL` defaults to `http://localhost:9200`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let urls: Vec<String> = lookup(ENV_URL)
            .unwrap_or_else(|| "http://localhost:9200".to_string())
            .split(',')
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        if urls.is_empty() {
            return Err(ElastiqError::Config(format!("{} is empty", ENV_URL)));
        }

        let mut config = Self::cluster(urls);

        match (lookup(ENV_USERNAME), lookup(ENV_PASSWORD)) {
            (Some(username), Some(password)) => {
                config = config.with_basic_auth(username, password);
            }
            (None, None) => {}
            _ => {
                return Err(ElastiqError::Config(format!(
                    "{} and {} must be set together",
                    ENV_USERNAME, ENV_PASSWORD
                )));
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ElastiqError::Config(format!("{} = '{}': {}", ENV_TIMEOUT_SECS, raw, e))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set basic authentication credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set maximum retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self::new("http://localhost:9200")
    }
}
