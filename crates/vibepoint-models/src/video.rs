//! Catalog video models.
//!
//! The catalog (indexes and the videos inside them) is owned by the remote
//! backend. `VideoVector` is the wire shape it returns; `VideoRecord` is the
//! flattened read-only projection the rest of the workspace works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration assumed for a video whose catalog entry has no duration yet.
pub const DEFAULT_VIDEO_DURATION_SECS: f64 = 180.0;

/// Identifier of a video in the remote catalog. Used as the correlation key
/// between analysis, polling and suggestion lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used in compact labels.
    pub fn short(&self) -> &str {
        short_id(&self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which catalog a video is analyzed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    /// Creator content that receives ad breaks
    #[default]
    Creator,
    /// An advertisement that can be inserted
    Ad,
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoKind::Creator => "creator",
            VideoKind::Ad => "ad",
        }
    }
}

impl fmt::Display for VideoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for an unrecognized video kind label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown video kind '{0}', expected creator or ad")]
pub struct ParseVideoKindError(pub String);

impl std::str::FromStr for VideoKind {
    type Err = ParseVideoKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creator" => Ok(VideoKind::Creator),
            "ad" => Ok(VideoKind::Ad),
            other => Err(ParseVideoKindError(other.to_string())),
        }
    }
}

/// Index listing entry as returned by `GET /12/index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSchema {
    pub id: String,
    #[serde(default, alias = "index_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Raw catalog video as returned by the `/12/index/{id}/video` endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoVector {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<VideoVectorMetadata>,
    #[serde(default)]
    pub system_metadata: Option<VideoVectorMetadata>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub indexed_at: Option<String>,
    #[serde(default)]
    pub hls: Option<HlsInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoVectorMetadata {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HlsInfo {
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_urls: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Read-only projection of a catalog video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub duration_sec: Option<f64>,
    pub filename: Option<String>,
    pub stream_url: Option<String>,
    pub thumbnail_urls: Vec<String>,
    pub indexed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl VideoRecord {
    /// Filename when known, otherwise a short id-based label.
    pub fn display_title(&self) -> String {
        match &self.filename {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Video {}", short_id(&self.id)),
        }
    }

    /// Duration to lay the timeline out against.
    pub fn effective_duration_sec(&self, fallback: f64) -> f64 {
        match self.duration_sec {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => fallback,
        }
    }

    /// "Indexed" once the catalog has finished indexing the video.
    pub fn status_label(&self) -> &'static str {
        if self.indexed_at.is_some() {
            "Indexed"
        } else {
            "Processing"
        }
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.thumbnail_urls.first().map(String::as_str)
    }
}

impl From<VideoVector> for VideoRecord {
    fn from(v: VideoVector) -> Self {
        let system = v.system_metadata.unwrap_or_default();
        let user = v.metadata.unwrap_or_default();
        let hls = v.hls.unwrap_or_default();

        Self {
            duration_sec: system.duration.or(user.duration),
            filename: system.filename.or(user.filename),
            stream_url: hls.video_url,
            thumbnail_urls: hls.thumbnail_urls.unwrap_or_default(),
            indexed_at: v.indexed_at.as_deref().and_then(crate::timestamp::parse_datetime),
            created_at: v.created_at.as_deref().and_then(crate::timestamp::parse_datetime),
            id: v.id,
        }
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
