//! Analysis job models.

use serde::{Deserialize, Serialize};

use crate::video::{VideoId, VideoKind};

/// What to analyze: a freshly uploaded object or an already indexed video.
///
/// Exactly one reference is ever sent. Once a video is indexed its id is
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTarget {
    /// Object key returned by the upload ticket
    Path(String),
    /// Catalog id of an indexed video
    VideoId(VideoId),
}

/// `POST /analyze` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: VideoKind,
}

impl AnalyzeRequest {
    pub fn new(target: &AnalysisTarget, kind: VideoKind) -> Self {
        match target {
            AnalysisTarget::Path(path) => Self {
                video_path: Some(path.clone()),
                video_id: None,
                kind,
            },
            AnalysisTarget::VideoId(id) => Self {
                video_path: None,
                video_id: Some(id.to_string()),
                kind,
            },
        }
    }
}

/// `POST /analyze` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Indexing task id, only present when a new object was submitted
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

/// A started analysis. Polling is keyed by `video_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub job_id: Option<String>,
    pub video_id: VideoId,
    pub kind: VideoKind,
}
