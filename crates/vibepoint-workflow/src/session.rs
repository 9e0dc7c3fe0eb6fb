//! Session orchestration.
//!
//! Wires the gateway, the object uploader, the poller and the reconciler into
//! the end-to-end flows the CLI exposes.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use vibepoint_gateway::{AnalysisBackend, GatewayClient, VideoCatalog};
use vibepoint_models::{
    AnalysisJob, AnalysisTarget, BreakPoint, IndexSchema, SuggestedAd, SuggestionsResponse,
    VideoId, VideoKind, VideoRecord,
};
use vibepoint_storage::{ObjectUploader, PresignedUploader};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::logging::WorkflowLogger;
use crate::poller::{AnalysisPoller, PollOutcome};
use crate::progress::ProgressSender;
use crate::reconcile::{breakpoints, reconcile, ResolutionGap};
use crate::render::{render_placements, TRACK_WIDTH};
use crate::timeline::TimelineLayout;
use crate::upload::{UploadOutcome, UploadPipeline};

/// Everything needed to show suggested placements for one creator video.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementReport {
    pub video_id: VideoId,
    pub duration_sec: f64,
    pub ads: Vec<SuggestedAd>,
    pub gaps: Vec<ResolutionGap>,
    pub breakpoints: Vec<BreakPoint>,
    pub layout: TimelineLayout,
}

impl PlacementReport {
    /// Timeline, cards and any unresolved ads, ready to print.
    pub fn render(&self, width: usize) -> String {
        let mut out = render_placements(&self.layout, &self.breakpoints, width);
        if !self.gaps.is_empty() {
            out.push('\n');
            for gap in &self.gaps {
                out.push_str(&format!(
                    "Ad {} ({}): {}\n",
                    gap.index + 1,
                    gap.ad_id.as_deref().unwrap_or("no id"),
                    gap.reason
                ));
            }
        }
        out
    }

    /// Render with the default track width.
    pub fn render_default(&self) -> String {
        self.render(TRACK_WIDTH)
    }
}

/// One user session against the analysis backend.
#[derive(Clone)]
pub struct Session {
    config: WorkflowConfig,
    backend: Arc<dyn AnalysisBackend>,
    catalog: Arc<dyn VideoCatalog>,
    uploader: Arc<dyn ObjectUploader>,
}

impl Session {
    /// Session talking to the configured backend over HTTP.
    pub fn new(config: WorkflowConfig) -> WorkflowResult<Self> {
        let gateway = Arc::new(GatewayClient::new(config.gateway.clone())?);
        let uploader = Arc::new(PresignedUploader::new(config.upload_connect_timeout)?);

        Ok(Self::with_parts(config, gateway.clone(), gateway, uploader))
    }

    pub fn with_parts(
        config: WorkflowConfig,
        backend: Arc<dyn AnalysisBackend>,
        catalog: Arc<dyn VideoCatalog>,
        uploader: Arc<dyn ObjectUploader>,
    ) -> Self {
        Self {
            config,
            backend,
            catalog,
            uploader,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// A poller sharing this session's backend and poll policy.
    pub fn poller(&self) -> AnalysisPoller {
        AnalysisPoller::new(Arc::clone(&self.backend), self.config.poll.clone())
    }

    /// Upload a local file and start analyzing it.
    pub async fn upload(
        &self,
        path: &Path,
        kind: VideoKind,
        progress: &ProgressSender,
    ) -> WorkflowResult<UploadOutcome> {
        UploadPipeline::new(Arc::clone(&self.backend), Arc::clone(&self.uploader))
            .run(path, kind, progress)
            .await
    }

    /// Start analysis of `target` and begin polling on `poller`.
    pub async fn analyze(
        &self,
        poller: &mut AnalysisPoller,
        target: &AnalysisTarget,
        kind: VideoKind,
    ) -> WorkflowResult<AnalysisJob> {
        poller.start(target, kind).await
    }

    /// Poll an already started analysis until suggestions arrive.
    pub async fn watch(
        &self,
        poller: &mut AnalysisPoller,
        video_id: &VideoId,
        creator_index: Option<&str>,
    ) -> WorkflowResult<PlacementReport> {
        poller.resume(video_id.clone());
        self.await_report(poller, video_id, creator_index).await
    }

    /// Wait for the poll running on `poller` and build the report from it.
    pub async fn await_report(
        &self,
        poller: &AnalysisPoller,
        video_id: &VideoId,
        creator_index: Option<&str>,
    ) -> WorkflowResult<PlacementReport> {
        match poller.wait_for_outcome().await {
            PollOutcome::Suggested(response) => {
                self.build_report(video_id, &response, creator_index).await
            }
            PollOutcome::TimedOut { attempts, elapsed } => {
                Err(WorkflowError::TimedOut { attempts, elapsed })
            }
            PollOutcome::Cancelled => Err(WorkflowError::Cancelled),
        }
    }

    /// Fetch suggestions once. A not-ready backend surfaces as an error.
    pub async fn suggest(
        &self,
        video_id: &VideoId,
        creator_index: Option<&str>,
    ) -> WorkflowResult<PlacementReport> {
        let response = self.backend.fetch_suggestions(video_id).await?;
        self.build_report(video_id, &response, creator_index).await
    }

    pub async fn list_indexes(&self) -> WorkflowResult<Vec<IndexSchema>> {
        Ok(self.catalog.list_indexes().await?)
    }

    pub async fn list_videos(&self, index_id: &str) -> WorkflowResult<Vec<VideoRecord>> {
        Ok(self.catalog.list_videos(index_id).await?)
    }

    async fn build_report(
        &self,
        video_id: &VideoId,
        response: &SuggestionsResponse,
        creator_index: Option<&str>,
    ) -> WorkflowResult<PlacementReport> {
        let logger = WorkflowLogger::reconcile(video_id);

        let reconciliation = reconcile(response, self.catalog.as_ref(), &self.config.ad_index_id).await;
        if !reconciliation.gaps.is_empty() {
            logger.unresolved(reconciliation.gaps.len(), reconciliation.ads.len());
        }

        let duration_sec = self.creator_duration(video_id, creator_index).await;
        let breakpoints = breakpoints(&reconciliation.ads);
        let layout = TimelineLayout::build(duration_sec, &breakpoints)?;

        logger.report_built(breakpoints.len(), duration_sec);

        Ok(PlacementReport {
            video_id: video_id.clone(),
            duration_sec,
            ads: reconciliation.ads,
            gaps: reconciliation.gaps,
            breakpoints,
            layout,
        })
    }

    /// Duration of the creator video, falling back to the configured default.
    async fn creator_duration(&self, video_id: &VideoId, creator_index: Option<&str>) -> f64 {
        let fallback = self.config.default_duration_sec;
        let Some(index_id) = creator_index else {
            return fallback;
        };

        match self.catalog.get_video(index_id, video_id.as_str()).await {
            Ok(record) => record.effective_duration_sec(fallback),
            Err(e) => {
                warn!(
                    video_id = %video_id,
                    index_id = %index_id,
                    error = %e,
                    "Creator video lookup failed, using default duration"
                );
                fallback
            }
        }
    }
}
