//! Ad suggestion models.
//!
//! `/suggest` has shipped two shapes for a suggested ad over time:
//! - **clip-based**: `{ id, clips: [{score, start, end, ...}] }`
//! - **legacy**: flat `{ ad_video_id, ad_name, placement_timestamp, relevance_score, ... }`
//!
//! [`SuggestedAdRaw`] settles which one an element is exactly once, at the
//! deserialization boundary. Decoding is total: an element that matches
//! neither shape decodes as an empty legacy ad.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lenient::{self, f64_field, str_field};
use crate::video::VideoRecord;

/// Confidence bucket attached to a matched clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A matched ad-video segment with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMatch {
    /// Similarity in [0, 1]
    pub score: f64,
    #[serde(rename = "start")]
    pub start_sec: f64,
    #[serde(rename = "end")]
    pub end_sec: f64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub video_id: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default, rename = "transcription")]
    pub transcript: Option<String>,
}

impl ClipMatch {
    pub fn duration_sec(&self) -> f64 {
        (self.end_sec - self.start_sec).max(0.0)
    }
}

/// Why an ad fits at a given moment of the creator video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(rename = "timestamp")]
    pub timestamp_sec: f64,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub situation_description: String,
    #[serde(default, deserialize_with = "lenient::seq_of")]
    pub themes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::seq_of")]
    pub ad_keywords: Vec<String>,
}

/// Current response shape: an ad video id and the clips that matched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClipBasedAd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_name: Option<String>,
    pub clips: Vec<ClipMatch>,
    /// Flat timestamp some backends still send alongside clips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_timestamp: Option<f64>,
}

impl ClipBasedAd {
    fn from_map(map: &Map<String, Value>) -> Self {
        let clips = match map.get("clips") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<ClipMatch>(item.clone()).ok())
                .filter(|clip| clip.score.is_finite() && clip.start_sec.is_finite() && clip.end_sec.is_finite())
                .collect(),
            _ => Vec::new(),
        };

        Self {
            id: str_field(map, "id").or_else(|| str_field(map, "ad_video_id")),
            ad_name: str_field(map, "ad_name"),
            clips,
            placement_timestamp: f64_field(map, "placement_timestamp"),
        }
    }

    /// Mean clip score in [0, 1], `None` when no clip matched.
    pub fn average_score(&self) -> Option<f64> {
        if self.clips.is_empty() {
            return None;
        }
        Some(self.clips.iter().map(|c| c.score).sum::<f64>() / self.clips.len() as f64)
    }
}

/// Older response shape with flat fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LegacyAd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_timestamp: Option<f64>,
    /// Already a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl LegacyAd {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            ad_video_id: str_field(map, "ad_video_id").or_else(|| str_field(map, "id")),
            ad_name: str_field(map, "ad_name"),
            placement_id: str_field(map, "placement_id"),
            placement_timestamp: f64_field(map, "placement_timestamp"),
            relevance_score: f64_field(map, "relevance_score"),
            reasoning: str_field(map, "reasoning"),
        }
    }
}

/// A suggested ad as sent by the backend, in either historical shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuggestedAdRaw {
    ClipBased(ClipBasedAd),
    Legacy(LegacyAd),
}

impl SuggestedAdRaw {
    /// Classify a JSON element. The presence of a `clips` key selects the
    /// clip-based shape; everything else is read as legacy.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("clips") => {
                SuggestedAdRaw::ClipBased(ClipBasedAd::from_map(&map))
            }
            Value::Object(map) => SuggestedAdRaw::Legacy(LegacyAd::from_map(&map)),
            _ => SuggestedAdRaw::Legacy(LegacyAd::default()),
        }
    }

    pub fn ad_id(&self) -> Option<&str> {
        match self {
            SuggestedAdRaw::ClipBased(ad) => ad.id.as_deref(),
            SuggestedAdRaw::Legacy(ad) => ad.ad_video_id.as_deref(),
        }
    }

    pub fn is_clip_based(&self) -> bool {
        matches!(self, SuggestedAdRaw::ClipBased(_))
    }
}

impl<'de> Deserialize<'de> for SuggestedAdRaw {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

/// `POST /suggest` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub video_id: String,
}

/// `POST /suggest` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub video_id: String,
    #[serde(default, deserialize_with = "lenient::seq_of")]
    pub suggested_ads: Vec<SuggestedAdRaw>,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub placement_count: u32,
    /// Positionally correlated with `suggested_ads`; a malformed entry keeps
    /// its slot as `None`.
    #[serde(default, deserialize_with = "lenient::slots_of")]
    pub placements: Option<Vec<Option<Placement>>>,
}

impl SuggestionsResponse {
    /// Placement describing `suggested_ads[index]`, if the backend sent one.
    pub fn placement_at(&self, index: usize) -> Option<&Placement> {
        self.placements
            .as_ref()
            .and_then(|slots| slots.get(index))
            .and_then(Option::as_ref)
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggested_ads.is_empty()
    }
}

/// Canonical ad record after reconciliation. Never sent back to the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SuggestedAd {
    pub ad_id: Option<String>,
    pub display_name: Option<String>,
    pub placement_timestamp_sec: f64,
    /// Percentage in [0, 100]
    pub match_score: Option<f64>,
    pub clips: Vec<ClipMatch>,
    pub placement: Option<Placement>,
    pub resolved_ad_video: Option<VideoRecord>,
    /// Free-text justification carried by legacy ads
    pub legacy_reasoning: Option<String>,
}

impl SuggestedAd {
    /// Highest-ranked clip, the backend orders clips by score.
    pub fn top_clip(&self) -> Option<&ClipMatch> {
        self.clips.first()
    }
}
