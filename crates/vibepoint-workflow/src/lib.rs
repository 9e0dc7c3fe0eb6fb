//! Ad-placement workflow.
//!
//! This crate provides:
//! - Upload pipeline from local file to started analysis
//! - Suggestion polling with cancellation and a bounded budget
//! - Reconciliation of both suggestion wire shapes into canonical ads
//! - Timeline layout and plain-text rendering
//! - Session orchestration used by the `vibepoint` binary

pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod progress;
pub mod reconcile;
pub mod render;
pub mod retry;
pub mod session;
pub mod timeline;
pub mod upload;

pub use config::{WorkflowConfig, DEFAULT_AD_INDEX_ID};
pub use error::{WorkflowError, WorkflowResult, UPLOAD_FAILED_TEXT};
pub use logging::{Phase, WorkflowLogger};
pub use poller::{AnalysisPoller, PollEvent, PollOutcome, PollReason, PollSnapshot, PollState};
pub use progress::{ProgressReceiver, ProgressSender, UploadProgress, UPLOAD_COMPLETE_TEXT};
pub use reconcile::{breakpoints, normalize, reconcile, GapReason, Reconciliation, ResolutionGap};
pub use retry::{FailureTracker, PollPolicy};
pub use session::{PlacementReport, Session};
pub use timeline::{position_percent, span_layout, LayoutError, TimelineLayout};
pub use upload::{UploadOutcome, UploadPipeline, UploadStage};
