//! Configuration for the analysis client

use crate::error::{ClientError, Result};
use crate::poller::PollPolicy;
use std::time::Duration;
use url::Url;

/// Environment variable holding the server base URL
pub const ENV_API_BASE: &str = "ANALYST_API_BASE";

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for talking to the analysis server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://localhost:8000`
    pub api_base: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Polling cadence and retry budget
    pub poll_policy: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_policy: PollPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "api_base must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.poll_policy.interval.is_zero() {
            return Err(ClientError::Config(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.poll_policy.max_consecutive_failures == Some(0) {
            return Err(ClientError::Config(
                "max_consecutive_failures must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed base URL, normalised to end with a slash so joins keep its path
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.api_base.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_base: Option<String>,
    request_timeout: Option<Duration>,
    poll_policy: Option<PollPolicy>,
}

impl ClientConfigBuilder {
    /// Set the server base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Load the server base URL from the environment when set
    pub fn with_env_api_base(mut self) -> Self {
        if let Ok(api_base) = std::env::var(ENV_API_BASE) {
            self.api_base = Some(api_base);
        }
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the polling policy
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = Some(policy);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let config = ClientConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            poll_policy: self.poll_policy.unwrap_or(defaults.poll_policy),
        };

        config.validate()?;
        Ok(config)
    }
}
