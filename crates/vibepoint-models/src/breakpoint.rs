//! Timeline breakpoint models.
//!
//! A breakpoint is the render-ready view of one suggested ad. It is derived
//! from the canonical suggestions on every render and never stored.

use serde::{Deserialize, Serialize};

/// Brand shown when the ad carries no advertiser metadata.
pub const DEFAULT_BRAND: &str = "Advertiser";

/// Rationale shown when neither placement nor ad explain the match.
pub const DEFAULT_RATIONALE: &str = "AI-matched ad based on video content analysis";

/// A marker on the creator timeline where an ad can be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakPoint {
    /// Stable within one render, e.g. `bp-0`
    pub id: String,
    pub timestamp_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_ad: Option<RecommendedAd>,
}

/// Card content for the ad proposed at a breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAd {
    pub title: String,
    pub brand: String,
    pub duration_sec: f64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub rationale: String,
    #[serde(default)]
    pub match_score_percent: Option<f64>,
    /// Themes detected in the creator video at this moment
    #[serde(default)]
    pub video_tags: Vec<String>,
    /// Keywords describing the ad
    #[serde(default)]
    pub ad_tags: Vec<String>,
    /// Terms present in both tag lists, compared case-insensitively
    #[serde(default)]
    pub matching_terms: Vec<String>,
}

impl RecommendedAd {
    pub fn has_matches(&self) -> bool {
        !self.matching_terms.is_empty()
    }
}
