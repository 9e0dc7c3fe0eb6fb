//! Progress reporting for the upload pipeline.
//!
//! The pipeline emits events without knowing where they go (terminal,
//! logs, a UI channel).

use tokio::sync::mpsc;

use crate::error::UPLOAD_FAILED_TEXT;
use crate::upload::UploadStage;

/// Text shown once the upload and analysis start succeeded.
pub const UPLOAD_COMPLETE_TEXT: &str = "Upload complete!";

/// Progress event emitted during an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadProgress {
    /// A new stage started
    Stage(UploadStage),

    /// Bytes written to object storage so far
    Bytes { sent: u64, total: u64 },

    /// All stages finished
    Complete,

    /// A stage failed and the pipeline stopped
    Failed { stage: UploadStage, error: String },
}

impl UploadProgress {
    /// User-facing status line for this event.
    pub fn text(&self) -> String {
        match self {
            UploadProgress::Stage(stage) => stage.progress_text().to_string(),
            UploadProgress::Bytes { sent, total } => {
                let percent = if *total == 0 { 100 } else { sent * 100 / total };
                format!("Uploading video... {}%", percent.min(100))
            }
            UploadProgress::Complete => UPLOAD_COMPLETE_TEXT.to_string(),
            UploadProgress::Failed { .. } => UPLOAD_FAILED_TEXT.to_string(),
        }
    }
}

/// Progress sender for async contexts.
///
/// Uses a bounded channel and never blocks the pipeline.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<UploadProgress>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::Sender<UploadProgress>) -> Self {
        Self { tx }
    }

    /// Send a progress event (non-blocking).
    pub fn send(&self, event: UploadProgress) {
        // Drop events if channel is full
        let _ = self.tx.try_send(event);
    }

    pub fn stage(&self, stage: UploadStage) {
        self.send(UploadProgress::Stage(stage));
    }

    pub fn bytes(&self, sent: u64, total: u64) {
        self.send(UploadProgress::Bytes { sent, total });
    }

    pub fn complete(&self) {
        self.send(UploadProgress::Complete);
    }

    pub fn failed(&self, stage: UploadStage, error: impl Into<String>) {
        self.send(UploadProgress::Failed {
            stage,
            error: error.into(),
        });
    }
}

/// Progress receiver for collecting events.
pub struct ProgressReceiver {
    rx: mpsc::Receiver<UploadProgress>,
}

impl ProgressReceiver {
    /// Receive the next progress event.
    pub async fn recv(&mut self) -> Option<UploadProgress> {
        self.rx.recv().await
    }

    /// Try to receive a progress event without blocking.
    pub fn try_recv(&mut self) -> Option<UploadProgress> {
        self.rx.try_recv().ok()
    }
}

/// Create a progress channel pair.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(64);
    (ProgressSender::new(tx), ProgressReceiver { rx })
}
