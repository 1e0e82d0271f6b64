//! Connector configuration
//!
//! The configuration is an explicit struct handed to the engine's
//! constructor; nothing reads ambient/global settings. Loaded from a JSON
//! file or an inline JSON string.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use serde::Deserialize;
use std::path::Path;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://api.mysample.com";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete connector configuration
#[derive(Clone, Deserialize)]
pub struct ConnectorConfig {
    /// Token used to authenticate against the API (secret)
    pub auth_token: String,

    /// Account whose entities are extracted
    pub account_id: String,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Optional identifying User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP client tuning
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl ConnectorConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields and the API URL
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            return Err(Error::missing_field("auth_token"));
        }
        if self.account_id.is_empty() {
            return Err(Error::missing_field("account_id"));
        }
        url::Url::parse(&self.api_url).map_err(|e| Error::InvalidConfigValue {
            field: "api_url".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

// The auth token is a secret; keep it out of debug output.
impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("auth_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("http", &self.http)
            .finish()
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

/// Backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size (max tokens in bucket)
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{ "auth_token": "dbt_abc123", "account_id": "42" }"#;
        let config = ConnectorConfig::from_json(json).unwrap();
        assert_eq!(config.auth_token, "dbt_abc123");
        assert_eq!(config.account_id, "42");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "auth_token": "dbt_abc123",
            "account_id": "42",
            "api_url": "https://cloud.example.com/api/v2",
            "user_agent": "dbtcloud-connector/0.1",
            "http": { "timeout_seconds": 10, "max_retries": 2 }
        }"#;
        let config = ConnectorConfig::from_json(json).unwrap();
        assert_eq!(config.api_url, "https://cloud.example.com/api/v2");
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.max_retries, 2);
        // Unspecified tuning keeps defaults
        assert_eq!(config.http.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = ConnectorConfig::from_json(r#"{ "account_id": "42" }"#).unwrap_err();
        assert!(err.to_string().contains("auth_token"));

        let err =
            ConnectorConfig::from_json(r#"{ "auth_token": "t", "account_id": "" }"#).unwrap_err();
        assert!(err.to_string().contains("account_id"));
    }

    #[test]
    fn test_invalid_api_url() {
        let json = r#"{ "auth_token": "t", "account_id": "42", "api_url": "not a url" }"#;
        let err = ConnectorConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("api_url"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            ConnectorConfig::from_json(r#"{ "auth_token": "secret", "account_id": "42" }"#)
                .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_default_http_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_backoff.initial_ms, 100);
        assert_eq!(config.rate_limit.requests_per_second, 10);
    }
}
