//! Shared data models for the VibePoint ad-placement workflow.
//!
//! This crate provides Serde-serializable types for:
//! - Upload tickets and analysis jobs
//! - Catalog indexes and videos
//! - Ad suggestions in both historical wire shapes
//! - Render-ready timeline breakpoints

pub mod analysis;
pub mod breakpoint;
pub mod lenient;
pub mod suggestion;
pub mod timestamp;
pub mod upload;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisJob, AnalysisTarget, AnalyzeRequest, AnalyzeResponse};
pub use breakpoint::{BreakPoint, RecommendedAd, DEFAULT_BRAND, DEFAULT_RATIONALE};
pub use suggestion::{
    ClipBasedAd, ClipMatch, Confidence, LegacyAd, Placement, SuggestRequest, SuggestedAd,
    SuggestedAdRaw, SuggestionsResponse,
};
pub use timestamp::format_clock;
pub use upload::{validate_filename, UploadTicket, UploadUrlRequest, UploadUrlResponse};
pub use video::{
    IndexSchema, ParseVideoKindError, VideoId, VideoKind, VideoRecord, VideoVector,
    DEFAULT_VIDEO_DURATION_SECS,
};
