//! Client configuration.

use std::fmt;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/enklipse/api/v1";

/// Configuration for the clip API client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the clip API
    pub base_url: String,
    /// Request timeout for one-shot calls
    pub timeout: Duration,
    /// Max retries for idempotent reads
    pub max_retries: u32,
    /// Shared key used to seal the viewer identity into stream URLs
    pub auth_secret: Option<String>,
    /// Bearer credential for authenticated calls
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            auth_secret: None,
            api_token: None,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ENKLIPSE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("ENKLIPSE_API_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: std::env::var("ENKLIPSE_API_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            auth_secret: std::env::var("ENKLIPSE_AUTH_SECRET_KEY").ok().filter(|s| !s.is_empty()),
            api_token: std::env::var("ENKLIPSE_API_TOKEN").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_auth_secret(mut self, secret: impl Into<String>) -> Self {
        self.auth_secret = Some(secret.into());
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "<redacted>"))
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.auth_secret.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::default()
            .with_api_token("tok_live_123")
            .with_auth_secret("hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("tok_live_123"));
        assert!(!debug.contains("hunter2"));
    }
}
