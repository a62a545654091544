//! Configuration management utilities

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the deployment environment
pub const ENV_ENVIRONMENT: &str = "ANALYST_ENV";
/// Environment variable holding the default log filter
pub const ENV_LOG_FILTER: &str = "ANALYST_LOG";
/// Environment variable toggling JSON log output
pub const ENV_JSON_LOGS: &str = "ANALYST_LOG_JSON";

/// Errors raised while reading application configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that cannot be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Application-level configuration shared by every binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
    /// Default `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "analyst-rs".to_string(),
            environment: "development".to_string(),
            log_filter: "warn,analyst_client=info,analyst_cli=info".to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            config.environment = environment;
        }
        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            config.log_filter = filter;
        }
        if let Some(raw) = lookup(ENV_JSON_LOGS) {
            config.json_logs = parse_flag(ENV_JSON_LOGS, &raw)?;
        }

        Ok(config)
    }

    /// Override the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "analyst-rs");
        assert!(!config.json_logs);
        assert!(!config.is_production());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_ENVIRONMENT, "production"),
            (ENV_LOG_FILTER, "debug"),
            (ENV_JSON_LOGS, "yes"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.log_filter, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_invalid_flag() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_JSON_LOGS, "maybe")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for ANALYST_LOG_JSON: maybe");
    }
}
