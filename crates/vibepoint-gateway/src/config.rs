//! Gateway configuration.

use std::time::Duration;

use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend base URL without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Config pointing at `base_url` with default timeouts.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Default::default()
        })
    }

    /// Create config from environment variables.
    pub fn from_env() -> GatewayResult<Self> {
        let base_url = std::env::var("VIBEPOINT_API_URL")
            .or_else(|_| std::env::var("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs: u64 = std::env::var("VIBEPOINT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("VIBEPOINT_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    /// Absolute URL for an API path such as `/suggest`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_base_url(raw: &str) -> GatewayResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::validation("API base URL cannot be empty"));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| GatewayError::validation(format!("invalid API base URL '{}': {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(GatewayError::validation(format!(
            "unsupported API URL scheme '{}'",
            other
        ))),
    }
}
