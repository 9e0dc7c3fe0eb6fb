//! Structured workflow logging.
//!
//! Every line carries the workflow phase and, once the backend has assigned
//! one, the video id. Poll lines also carry the generation so two polls of
//! the same video can be told apart in the logs.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{error, field, info, info_span, warn, Span};
use vibepoint_models::{AnalysisJob, VideoId, VideoKind};

use crate::retry::PollPolicy;
use crate::upload::UploadStage;

/// Which part of the workflow a logger speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Upload,
    Poll,
    Reconcile,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Upload => "upload",
            Phase::Poll => "poll",
            Phase::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger for one video in one phase of the workflow.
///
/// Uploads have no video id until analysis starts, so they are keyed by the
/// local filename instead.
#[derive(Debug, Clone)]
pub struct WorkflowLogger {
    phase: Phase,
    video_id: Option<VideoId>,
    filename: Option<String>,
    generation: Option<u64>,
}

impl WorkflowLogger {
    pub fn upload(filename: &str) -> Self {
        Self {
            phase: Phase::Upload,
            video_id: None,
            filename: Some(filename.to_string()),
            generation: None,
        }
    }

    pub fn poll(video_id: &VideoId, generation: u64) -> Self {
        Self {
            phase: Phase::Poll,
            video_id: Some(video_id.clone()),
            filename: None,
            generation: Some(generation),
        }
    }

    pub fn reconcile(video_id: &VideoId) -> Self {
        Self {
            phase: Phase::Reconcile,
            video_id: Some(video_id.clone()),
            filename: None,
            generation: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Span carrying the phase and whichever identifiers are known.
    pub fn span(&self) -> Span {
        let span = info_span!(
            "workflow",
            phase = self.phase.as_str(),
            video_id = field::Empty,
            filename = field::Empty,
            generation = field::Empty,
        );
        if let Some(video_id) = &self.video_id {
            span.record("video_id", video_id.as_str());
        }
        if let Some(filename) = &self.filename {
            span.record("filename", filename.as_str());
        }
        if let Some(generation) = self.generation {
            span.record("generation", generation);
        }
        span
    }

    fn video(&self) -> Option<&str> {
        self.video_id.as_ref().map(VideoId::as_str)
    }

    // Upload

    pub fn upload_started(&self, path: &Path, kind: VideoKind) {
        info!(
            phase = %self.phase,
            filename = self.filename.as_deref(),
            kind = kind.as_str(),
            "Uploading {}", path.display()
        );
    }

    pub fn unknown_extension(&self) {
        warn!(
            phase = %self.phase,
            filename = self.filename.as_deref(),
            "File extension is not a known video format, uploading anyway"
        );
    }

    pub fn upload_stored(&self, read_path: &str) {
        info!(phase = %self.phase, filename = self.filename.as_deref(), read_path, "Video stored");
    }

    pub fn upload_failed(&self, stage: UploadStage, error: &str) {
        error!(
            phase = %self.phase,
            filename = self.filename.as_deref(),
            stage = %stage,
            error,
            "Upload failed"
        );
    }

    pub fn upload_finished(&self, job: &AnalysisJob) {
        info!(
            phase = %self.phase,
            filename = self.filename.as_deref(),
            video_id = %job.video_id,
            job_id = job.job_id.as_deref(),
            "Upload complete, analysis started"
        );
    }

    // Poll

    pub fn poll_started(&self, policy: &PollPolicy) {
        info!(
            phase = %self.phase,
            video_id = self.video(),
            generation = self.generation,
            interval = ?policy.interval,
            max_attempts = policy.max_attempts,
            "Polling for suggestions"
        );
    }

    /// An attempt that found nothing yet.
    pub fn attempt_pending(&self, attempt: u32, outcome: &'static str) {
        info!(
            phase = %self.phase,
            video_id = self.video(),
            generation = self.generation,
            attempt,
            outcome,
            "Suggestions not available yet"
        );
    }

    pub fn suggestions_ready(&self, attempt: u32, ads: usize) {
        info!(
            phase = %self.phase,
            video_id = self.video(),
            generation = self.generation,
            attempt,
            ads,
            "Suggestions ready"
        );
    }

    pub fn gave_up(&self, attempts: u32, elapsed: Duration) {
        warn!(
            phase = %self.phase,
            video_id = self.video(),
            generation = self.generation,
            attempts,
            elapsed = ?elapsed,
            "Giving up on suggestions, analysis may still be running"
        );
    }

    // Reconcile

    pub fn unresolved(&self, gaps: usize, ads: usize) {
        warn!(
            phase = %self.phase,
            video_id = self.video(),
            gaps,
            ads,
            "Some suggested ads could not be resolved in the ad catalog"
        );
    }

    pub fn report_built(&self, placements: usize, duration_sec: f64) {
        info!(
            phase = %self.phase,
            video_id = self.video(),
            placements,
            duration_sec,
            "Placement report ready"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_logger_carries_generation() {
        let logger = WorkflowLogger::poll(&VideoId::from("vid-42"), 3);
        assert_eq!(logger.phase(), Phase::Poll);
        assert_eq!(logger.video_id(), Some(&VideoId::from("vid-42")));
        assert_eq!(logger.generation(), Some(3));
    }

    #[test]
    fn test_upload_logger_has_no_video_yet() {
        let logger = WorkflowLogger::upload("clip.mp4");
        assert_eq!(logger.phase(), Phase::Upload);
        assert!(logger.video_id().is_none());
        assert!(logger.generation().is_none());
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Reconcile.to_string(), "reconcile");
        assert_eq!(WorkflowLogger::reconcile(&VideoId::from("v")).phase().as_str(), "reconcile");
    }
}
