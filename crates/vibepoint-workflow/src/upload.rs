//! Upload pipeline.
//!
//! Three sequential stages for one local file:
//! 1. Ask the backend for a pre-signed upload ticket
//! 2. Stream the bytes to object storage
//! 3. Start analysis of the uploaded object
//!
//! The first failing stage aborts the pipeline. Nothing is retried; in
//! particular analysis is never started for bytes that did not land.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use url::Url;

use vibepoint_gateway::AnalysisBackend;
use vibepoint_models::{AnalysisJob, AnalysisTarget, VideoKind};
use vibepoint_storage::{is_video_path, public_url, ObjectUploader, ProgressFn, SIGNED_CONTENT_TYPE};

use crate::error::{WorkflowError, WorkflowResult};
use crate::logging::WorkflowLogger;
use crate::progress::ProgressSender;

/// Pipeline stage, used for progress and to locate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    RequestingTicket,
    Transferring,
    StartingAnalysis,
}

impl UploadStage {
    pub fn progress_text(&self) -> &'static str {
        match self {
            UploadStage::RequestingTicket => "Generating upload URL...",
            UploadStage::Transferring => "Uploading video...",
            UploadStage::StartingAnalysis => "Starting video analysis...",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStage::RequestingTicket => "requesting upload URL",
            UploadStage::Transferring => "uploading video",
            UploadStage::StartingAnalysis => "starting analysis",
        };
        write!(f, "{}", s)
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Object key the backend analyzes
    pub read_path: String,
    /// Public URL of the uploaded bytes, playable before indexing finishes
    pub stream_url: Url,
    pub job: AnalysisJob,
}

/// Drives one upload from local file to started analysis.
#[derive(Clone)]
pub struct UploadPipeline {
    backend: Arc<dyn AnalysisBackend>,
    uploader: Arc<dyn ObjectUploader>,
}

impl UploadPipeline {
    pub fn new(backend: Arc<dyn AnalysisBackend>, uploader: Arc<dyn ObjectUploader>) -> Self {
        Self { backend, uploader }
    }

    /// Upload `path` and start analyzing it as `kind`.
    pub async fn run(
        &self,
        path: &Path,
        kind: VideoKind,
        progress: &ProgressSender,
    ) -> WorkflowResult<UploadOutcome> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let logger = WorkflowLogger::upload(&filename);
        let span = logger.span();

        async {
            let fail = |stage: UploadStage, error: String| {
                logger.upload_failed(stage, &error);
                progress.failed(stage, error.clone());
                WorkflowError::upload_failed(stage, error)
            };

            if filename.is_empty() {
                return Err(fail(UploadStage::RequestingTicket, "path has no file name".into()));
            }
            if !is_video_path(path) {
                logger.unknown_extension();
            }
            logger.upload_started(path, kind);

            progress.stage(UploadStage::RequestingTicket);
            let ticket = self
                .backend
                .request_upload(&filename)
                .await
                .map_err(|e| fail(UploadStage::RequestingTicket, e.to_string()))?;

            progress.stage(UploadStage::Transferring);
            if ticket.is_expired(Utc::now()) {
                return Err(fail(
                    UploadStage::Transferring,
                    format!("upload URL expired at {}", ticket.expires_at),
                ));
            }
            self.uploader
                .put_object(
                    &ticket.write_url,
                    path,
                    SIGNED_CONTENT_TYPE,
                    Some(byte_progress(progress.clone())),
                )
                .await
                .map_err(|e| fail(UploadStage::Transferring, e.to_string()))?;
            logger.upload_stored(&ticket.read_path);

            progress.stage(UploadStage::StartingAnalysis);
            let job = self
                .backend
                .start_analysis(&AnalysisTarget::Path(ticket.read_path.clone()), kind)
                .await
                .map_err(|e| fail(UploadStage::StartingAnalysis, e.to_string()))?;

            progress.complete();
            logger.upload_finished(&job);

            Ok::<_, WorkflowError>(UploadOutcome {
                stream_url: public_url(&ticket.write_url),
                read_path: ticket.read_path,
                job,
            })
        }
        .instrument(span)
        .await
    }
}

/// Forward byte counts to `progress`, at most once per whole percent.
fn byte_progress(progress: ProgressSender) -> ProgressFn {
    let last_percent = AtomicU64::new(u64::MAX);
    Arc::new(move |sent, total| {
        let percent = if total == 0 { 100 } else { sent * 100 / total };
        if last_percent.swap(percent, Ordering::Relaxed) != percent {
            progress.bytes(sent, total);
        }
    })
}
