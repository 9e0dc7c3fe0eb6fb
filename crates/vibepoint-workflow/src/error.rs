//! Workflow error types.

use std::time::Duration;

use thiserror::Error;
use vibepoint_gateway::GatewayError;
use vibepoint_storage::StorageError;

use crate::timeline::LayoutError;
use crate::upload::UploadStage;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Text shown to the user for any upload failure.
pub const UPLOAD_FAILED_TEXT: &str = "Upload failed. Please try again.";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Upload failed while {stage}: {message}")]
    UploadFailed { stage: UploadStage, message: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Analysis timed out after {attempts} attempts ({elapsed:?})")]
    TimedOut { attempts: u32, elapsed: Duration },

    #[error("Polling cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WorkflowError {
    pub fn upload_failed(stage: UploadStage, msg: impl Into<String>) -> Self {
        Self::UploadFailed {
            stage,
            message: msg.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the backend reported suggestions are not computed yet.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, WorkflowError::Gateway(e) if e.is_not_ready())
    }

    /// Actionable text for the person running the workflow.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::UploadFailed { .. } | WorkflowError::Storage(_) => {
                UPLOAD_FAILED_TEXT.to_string()
            }
            WorkflowError::Gateway(GatewayError::NotReady(_)) => {
                "Analysis still processing. Please wait and try again...".to_string()
            }
            WorkflowError::Gateway(GatewayError::Validation(msg)) => {
                format!("Invalid request: {}", msg)
            }
            WorkflowError::Gateway(_) => {
                "The analysis service could not be reached. Please try again.".to_string()
            }
            WorkflowError::Layout(_) => {
                "Video duration is unknown, the timeline cannot be drawn.".to_string()
            }
            WorkflowError::TimedOut { .. } => {
                "Analysis may still be processing. Please try fetching suggestions again later."
                    .to_string()
            }
            WorkflowError::Cancelled => "Analysis polling was cancelled.".to_string(),
            WorkflowError::Config(msg) => format!("Configuration error: {}", msg),
        }
    }
}
