//! Ad-suggestion reconciliation.
//!
//! Turns a raw `/suggest` response into canonical [`SuggestedAd`] records and,
//! for rendering, into timeline [`BreakPoint`]s.
//!
//! `placements[i]` describes `suggested_ads[i]`. When the backend sends fewer
//! placements than ads the tail ads simply have none; surplus placements are
//! ignored. Nothing in here fails: missing data degrades to absent fields and
//! catalog lookups that go wrong are reported as [`ResolutionGap`]s.

use std::fmt;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use vibepoint_gateway::VideoCatalog;
use vibepoint_models::{
    BreakPoint, ClipBasedAd, LegacyAd, Placement, RecommendedAd, SuggestedAd, SuggestedAdRaw,
    SuggestionsResponse, DEFAULT_BRAND, DEFAULT_RATIONALE,
};

/// Canonical ads plus the lookups that could not be completed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub ads: Vec<SuggestedAd>,
    pub gaps: Vec<ResolutionGap>,
}

/// An ad whose catalog entry could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionGap {
    /// Position in the suggestion list
    pub index: usize,
    pub ad_id: Option<String>,
    pub reason: GapReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum GapReason {
    MissingAdId,
    LookupFailed(String),
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::MissingAdId => write!(f, "ad has no id"),
            GapReason::LookupFailed(e) => write!(f, "catalog lookup failed: {}", e),
        }
    }
}

/// Canonical form of every suggested ad, in response order.
pub fn normalize(response: &SuggestionsResponse) -> Vec<SuggestedAd> {
    if let Some(placements) = &response.placements {
        if placements.len() > response.suggested_ads.len() {
            debug!(
                video_id = %response.video_id,
                ads = response.suggested_ads.len(),
                placements = placements.len(),
                "Ignoring placements without a matching ad"
            );
        }
    }

    response
        .suggested_ads
        .iter()
        .enumerate()
        .map(|(i, raw)| normalize_ad(raw, response.placement_at(i).cloned()))
        .collect()
}

fn normalize_ad(raw: &SuggestedAdRaw, placement: Option<Placement>) -> SuggestedAd {
    match raw {
        SuggestedAdRaw::ClipBased(ad) => from_clip_based(ad, placement),
        SuggestedAdRaw::Legacy(ad) => from_legacy(ad, placement),
    }
}

fn from_clip_based(ad: &ClipBasedAd, placement: Option<Placement>) -> SuggestedAd {
    let placement_timestamp_sec = placement
        .as_ref()
        .map(|p| p.timestamp_sec)
        .or_else(|| ad.clips.first().map(|c| c.start_sec))
        .or(ad.placement_timestamp)
        .unwrap_or(0.0);

    SuggestedAd {
        ad_id: ad.id.clone(),
        display_name: ad.ad_name.clone(),
        placement_timestamp_sec,
        match_score: ad.average_score().map(|avg| (avg * 100.0).round()),
        clips: ad.clips.clone(),
        placement,
        resolved_ad_video: None,
        legacy_reasoning: None,
    }
}

fn from_legacy(ad: &LegacyAd, placement: Option<Placement>) -> SuggestedAd {
    let placement_timestamp_sec = placement
        .as_ref()
        .map(|p| p.timestamp_sec)
        .or(ad.placement_timestamp)
        .unwrap_or(0.0);

    SuggestedAd {
        ad_id: ad.ad_video_id.clone(),
        display_name: ad.ad_name.clone(),
        placement_timestamp_sec,
        match_score: ad.relevance_score,
        clips: Vec::new(),
        placement,
        resolved_ad_video: None,
        legacy_reasoning: ad.reasoning.clone(),
    }
}

/// Normalize `response` and resolve every ad against the ad catalog.
///
/// Lookups run concurrently; each failure only affects its own ad.
pub async fn reconcile(
    response: &SuggestionsResponse,
    catalog: &dyn VideoCatalog,
    ad_index_id: &str,
) -> Reconciliation {
    let mut ads = normalize(response);

    let lookups = ads.iter().map(|ad| async move {
        match ad.ad_id.as_deref() {
            Some(id) => catalog
                .get_video(ad_index_id, id)
                .await
                .map_err(|e| GapReason::LookupFailed(e.to_string())),
            None => Err(GapReason::MissingAdId),
        }
    });
    let results = join_all(lookups).await;

    let mut gaps = Vec::new();
    for (index, (ad, result)) in ads.iter_mut().zip(results).enumerate() {
        match result {
            Ok(record) => ad.resolved_ad_video = Some(record),
            Err(reason) => {
                warn!(
                    video_id = %response.video_id,
                    index,
                    ad_id = ?ad.ad_id,
                    reason = %reason,
                    "Could not resolve suggested ad"
                );
                gaps.push(ResolutionGap {
                    index,
                    ad_id: ad.ad_id.clone(),
                    reason,
                });
            }
        }
    }

    Reconciliation { ads, gaps }
}

/// Render-ready breakpoints, one per ad, in input order.
pub fn breakpoints(ads: &[SuggestedAd]) -> Vec<BreakPoint> {
    ads.iter()
        .enumerate()
        .map(|(i, ad)| BreakPoint {
            id: format!("bp-{}", i),
            timestamp_sec: ad.placement_timestamp_sec,
            label: Some(format!("Ad Break {}", i + 1)),
            recommended_ad: Some(recommended_ad(i, ad)),
        })
        .collect()
}

fn recommended_ad(index: usize, ad: &SuggestedAd) -> RecommendedAd {
    let top_clip = ad.top_clip();
    let resolved = ad.resolved_ad_video.as_ref();

    let title = non_empty(ad.display_name.as_deref())
        .map(str::to_string)
        .or_else(|| resolved.and_then(|v| non_empty(v.filename.as_deref())).map(str::to_string))
        .or_else(|| ad.ad_id.as_ref().map(|id| format!("Ad {}", id)))
        .unwrap_or_else(|| format!("Advertisement {}", index + 1));

    let duration_sec = top_clip
        .map(|c| c.duration_sec())
        .filter(|d| *d > 0.0)
        .or_else(|| resolved.and_then(|v| v.duration_sec).filter(|d| d.is_finite() && *d > 0.0))
        .unwrap_or(0.0);

    let thumbnail_url = top_clip
        .and_then(|c| c.thumbnail_url.clone())
        .or_else(|| resolved.and_then(|v| v.poster_url()).map(str::to_string));

    let rationale = ad
        .placement
        .as_ref()
        .and_then(|p| non_empty(Some(p.reason.as_str())))
        .or_else(|| non_empty(ad.legacy_reasoning.as_deref()))
        .or_else(|| top_clip.and_then(|c| non_empty(c.transcript.as_deref())))
        .unwrap_or(DEFAULT_RATIONALE)
        .to_string();

    let (video_tags, ad_tags) = ad
        .placement
        .as_ref()
        .map(|p| (p.themes.clone(), p.ad_keywords.clone()))
        .unwrap_or_default();
    let matching_terms = matching_terms(&video_tags, &ad_tags);

    RecommendedAd {
        title,
        brand: DEFAULT_BRAND.to_string(),
        duration_sec,
        thumbnail_url,
        rationale,
        match_score_percent: ad.match_score,
        video_tags,
        ad_tags,
        matching_terms,
    }
}

/// Terms that appear in both lists, case-insensitively, in `video_tags` order.
fn matching_terms(video_tags: &[String], ad_tags: &[String]) -> Vec<String> {
    let ad_lower: Vec<String> = ad_tags.iter().map(|t| t.trim().to_lowercase()).collect();
    let mut seen: Vec<String> = Vec::new();

    video_tags
        .iter()
        .filter(|tag| {
            let lower = tag.trim().to_lowercase();
            if lower.is_empty() || seen.contains(&lower) || !ad_lower.contains(&lower) {
                return false;
            }
            seen.push(lower);
            true
        })
        .cloned()
        .collect()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
