//! Configuration management for routectl

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use crate::error::{RouteError, RouteResult};
use crate::retry::{RetryPolicy, RetrySettings};

const ENV_URL: &str = "PRITUNL_URL";
const ENV_TOKEN: &str = "PRITUNL_TOKEN";
const ENV_SECRET: &str = "PRITUNL_SECRET";
const ENV_INSECURE: &str = "PRITUNL_INSECURE";
const ENV_CONNECTION_CHECK: &str = "PRITUNL_CONNECTION_CHECK";

/// Main routectl configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Gateway API connection settings
    #[serde(default)]
    pub api: ApiSettings,
    /// Retry settings for read-only calls
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the gateway API
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub secret: String,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
    /// Check the API once at configure time
    #[serde(default = "default_connection_check")]
    pub connection_check: bool,
}

fn default_connection_check() -> bool {
    true
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            secret: String::new(),
            insecure: false,
            connection_check: default_connection_check(),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("connection_check", &self.connection_check)
            .finish()
    }
}

fn parse_bool_env(name: &str, value: &str) -> RouteResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RouteError::ConfigError(format!("{} must be a boolean, got '{}'", name, value))),
    }
}

impl ProviderConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> RouteResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RouteError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RouteError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RouteResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RouteError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| RouteError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Overlay `PRITUNL_*` environment variables
    pub fn apply_env(&mut self) -> RouteResult<()> {
        if let Ok(url) = std::env::var(ENV_URL) {
            self.api.url = url;
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            self.api.token = token;
        }
        if let Ok(secret) = std::env::var(ENV_SECRET) {
            self.api.secret = secret;
        }
        if let Ok(insecure) = std::env::var(ENV_INSECURE) {
            self.api.insecure = parse_bool_env(ENV_INSECURE, &insecure)?;
        }
        if let Ok(check) = std::env::var(ENV_CONNECTION_CHECK) {
            self.api.connection_check = parse_bool_env(ENV_CONNECTION_CHECK, &check)?;
        }
        Ok(())
    }

    /// Configuration built from the environment alone
    pub fn from_env() -> RouteResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Check that every required setting is present
    pub fn validate(&self) -> RouteResult<()> {
        for (name, value) in [
            ("url", &self.api.url),
            ("token", &self.api.token),
            ("secret", &self.api.secret),
        ] {
            if value.trim().is_empty() {
                return Err(RouteError::ConfigError(format!("api.{} is required", name)));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}
