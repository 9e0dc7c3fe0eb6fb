//! Workflow configuration.

use std::time::Duration;

use vibepoint_gateway::GatewayConfig;
use vibepoint_models::DEFAULT_VIDEO_DURATION_SECS;

use crate::error::{WorkflowError, WorkflowResult};
use crate::retry::PollPolicy;

/// Catalog index holding the advertiser videos.
pub const DEFAULT_AD_INDEX_ID: &str = "68e185ef64ff05606e152638";

/// Workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Backend gateway settings
    pub gateway: GatewayConfig,
    /// Index that suggested ad ids are resolved against
    pub ad_index_id: String,
    /// Suggestion polling schedule
    pub poll: PollPolicy,
    /// Timeline length used when the catalog has no duration for a video
    pub default_duration_sec: f64,
    /// Connect timeout for the object-storage PUT
    pub upload_connect_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            ad_index_id: DEFAULT_AD_INDEX_ID.to_string(),
            poll: PollPolicy::default(),
            default_duration_sec: DEFAULT_VIDEO_DURATION_SECS,
            upload_connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WorkflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkflowResult<Self> {
        let defaults = Self::default();

        let gateway = GatewayConfig::from_env().map_err(|e| WorkflowError::config_error(e.to_string()))?;

        let ad_index_id = std::env::var("VIBEPOINT_AD_INDEX_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.ad_index_id);

        let default_duration_sec = std::env::var("VIBEPOINT_DEFAULT_DURATION_SECS")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(defaults.default_duration_sec);

        let upload_connect_timeout = std::env::var("VIBEPOINT_UPLOAD_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.upload_connect_timeout);

        Ok(Self {
            gateway,
            ad_index_id,
            poll: PollPolicy::from_env(),
            default_duration_sec,
            upload_connect_timeout,
        })
    }

    /// Override the backend base URL, e.g. from a command-line flag.
    pub fn with_api_url(mut self, api_url: &str) -> WorkflowResult<Self> {
        let timeout = self.gateway.timeout;
        let connect_timeout = self.gateway.connect_timeout;
        let mut gateway = GatewayConfig::new(api_url).map_err(|e| WorkflowError::config_error(e.to_string()))?;
        gateway.timeout = timeout;
        gateway.connect_timeout = connect_timeout;
        self.gateway = gateway;
        Ok(self)
    }
}
