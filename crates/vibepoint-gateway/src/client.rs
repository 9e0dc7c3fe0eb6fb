//! Analysis backend REST client.
//!
//! One round trip per operation with:
//! - HTTP client tuning (pooling, timeouts)
//! - Error body decoding (`PLACEMENT_NOT_FOUND` becomes [`GatewayError::NotReady`])
//! - Observability (tracing spans, metrics)
//!
//! Nothing is cached and nothing is retried here; the polling layer decides
//! when to ask again.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use vibepoint_models::{
    validate_filename, AnalysisJob, AnalysisTarget, AnalyzeRequest, AnalyzeResponse, IndexSchema,
    SuggestRequest, SuggestionsResponse, UploadTicket, UploadUrlRequest, UploadUrlResponse,
    VideoId, VideoKind, VideoRecord, VideoVector,
};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::metrics::{record_not_ready, record_request};

// =============================================================================
// Seams
// =============================================================================

/// Operations that drive an analysis from upload to suggestions.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Obtain a pre-signed write grant for `filename`.
    async fn request_upload(&self, filename: &str) -> GatewayResult<UploadTicket>;

    /// Start analyzing an uploaded object or an indexed video.
    async fn start_analysis(
        &self,
        target: &AnalysisTarget,
        kind: VideoKind,
    ) -> GatewayResult<AnalysisJob>;

    /// Fetch suggestions; [`GatewayError::NotReady`] while analysis runs.
    async fn fetch_suggestions(&self, video_id: &VideoId) -> GatewayResult<SuggestionsResponse>;
}

/// Read-only catalog lookups.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn list_indexes(&self) -> GatewayResult<Vec<IndexSchema>>;

    async fn list_videos(&self, index_id: &str) -> GatewayResult<Vec<VideoRecord>>;

    async fn get_video(&self, index_id: &str, video_id: &str) -> GatewayResult<VideoRecord>;
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

// =============================================================================
// Client
// =============================================================================

/// Analysis backend client.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vibepoint-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::Transport)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Backend liveness probe.
    pub async fn health(&self) -> GatewayResult<HealthStatus> {
        let url = self.config.endpoint("/health");

        self.execute_request("health", None, async {
            let response = self.http.get(&url).send().await?;
            Self::read_json(&url, response).await
        })
        .await
    }

    /// Obtain a pre-signed upload ticket.
    ///
    /// The filename is validated locally first; a rejected name never reaches
    /// the network.
    pub async fn request_upload(&self, filename: &str) -> GatewayResult<UploadTicket> {
        let filename = validate_filename(filename).map_err(GatewayError::validation)?;
        let url = self.config.endpoint("/upload");
        let body = UploadUrlRequest { filename };

        self.execute_request("request_upload", None, async {
            let response = self.http.post(&url).json(&body).send().await?;
            let resp: UploadUrlResponse = Self::read_json(&url, response).await?;

            UploadTicket::from_response(resp, Utc::now())
                .map_err(|e| GatewayError::invalid_response(format!("upload_url is not a URL: {}", e)))
        })
        .await
    }

    /// Start an analysis job.
    pub async fn start_analysis(
        &self,
        target: &AnalysisTarget,
        kind: VideoKind,
    ) -> GatewayResult<AnalysisJob> {
        let url = self.config.endpoint("/analyze");
        let body = AnalyzeRequest::new(target, kind);
        let known_id = match target {
            AnalysisTarget::VideoId(id) => Some(id.clone()),
            AnalysisTarget::Path(_) => None,
        };

        self.execute_request("start_analysis", known_id.as_ref(), async {
            let response = self.http.post(&url).json(&body).send().await?;
            let resp: AnalyzeResponse = Self::read_json(&url, response).await?;

            let video_id = match known_id.clone() {
                Some(id) => id,
                None => resp
                    .video_id
                    .filter(|id| !id.trim().is_empty())
                    .map(VideoId::from)
                    .ok_or_else(|| GatewayError::invalid_response("analyze response has no video_id"))?,
            };

            Ok(AnalysisJob {
                job_id: resp.id,
                video_id,
                kind,
            })
        })
        .await
    }

    /// Fetch ad suggestions for an analyzed video.
    pub async fn fetch_suggestions(&self, video_id: &VideoId) -> GatewayResult<SuggestionsResponse> {
        let url = self.config.endpoint("/suggest");
        let body = SuggestRequest {
            video_id: video_id.to_string(),
        };

        let result = self
            .execute_request("fetch_suggestions", Some(video_id), async {
                let response = self.http.post(&url).json(&body).send().await?;
                Self::read_json(&url, response).await
            })
            .await;

        if matches!(&result, Err(e) if e.is_not_ready()) {
            record_not_ready();
        }
        result
    }

    pub async fn list_indexes(&self) -> GatewayResult<Vec<IndexSchema>> {
        let url = self.config.endpoint("/12/index");

        self.execute_request("list_indexes", None, async {
            let response = self.http.get(&url).send().await?;
            Self::read_json(&url, response).await
        })
        .await
    }

    pub async fn list_videos(&self, index_id: &str) -> GatewayResult<Vec<VideoRecord>> {
        let url = self
            .config
            .endpoint(&format!("/12/index/{}/video", urlencoding::encode(index_id)));

        self.execute_request("list_videos", None, async {
            let response = self.http.get(&url).send().await?;
            let videos: Vec<VideoVector> = Self::read_json(&url, response).await?;
            Ok(videos.into_iter().map(VideoRecord::from).collect())
        })
        .await
    }

    pub async fn get_video(&self, index_id: &str, video_id: &str) -> GatewayResult<VideoRecord> {
        let url = self.config.endpoint(&format!(
            "/12/index/{}/video/{}",
            urlencoding::encode(index_id),
            urlencoding::encode(video_id)
        ));
        let id = VideoId::from(video_id);

        self.execute_request("get_video", Some(&id), async {
            let response = self.http.get(&url).send().await?;
            let video: VideoVector = Self::read_json(&url, response).await?;
            Ok(VideoRecord::from(video))
        })
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Execute a request with tracing span and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        video_id: Option<&VideoId>,
        fut: F,
    ) -> GatewayResult<T>
    where
        F: std::future::Future<Output = GatewayResult<T>>,
    {
        let span = if let Some(id) = video_id {
            info_span!("gateway_request", operation = %operation, video_id = %id)
        } else {
            info_span!("gateway_request", operation = %operation)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> GatewayResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, url, response).await);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> GatewayError {
        let body = response.text().await.unwrap_or_default();
        debug!(url = %url, status = status.as_u16(), body = %body, "Backend returned error");
        GatewayError::from_http_status(status.as_u16(), body)
    }
}

#[async_trait]
impl AnalysisBackend for GatewayClient {
    async fn request_upload(&self, filename: &str) -> GatewayResult<UploadTicket> {
        GatewayClient::request_upload(self, filename).await
    }

    async fn start_analysis(
        &self,
        target: &AnalysisTarget,
        kind: VideoKind,
    ) -> GatewayResult<AnalysisJob> {
        GatewayClient::start_analysis(self, target, kind).await
    }

    async fn fetch_suggestions(&self, video_id: &VideoId) -> GatewayResult<SuggestionsResponse> {
        GatewayClient::fetch_suggestions(self, video_id).await
    }
}

#[async_trait]
impl VideoCatalog for GatewayClient {
    async fn list_indexes(&self) -> GatewayResult<Vec<IndexSchema>> {
        GatewayClient::list_indexes(self).await
    }

    async fn list_videos(&self, index_id: &str) -> GatewayResult<Vec<VideoRecord>> {
        GatewayClient::list_videos(self, index_id).await
    }

    async fn get_video(&self, index_id: &str, video_id: &str) -> GatewayResult<VideoRecord> {
        GatewayClient::get_video(self, index_id, video_id).await
    }
}
