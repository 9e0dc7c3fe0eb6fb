//! Timeline layout.
//!
//! Maps timestamps on the creator video onto percentages of a fixed-width
//! track. Out-of-range timestamps are clamped to the track ends, never dropped.
//! Markers are laid out independently, so two breakpoints at the same second
//! produce two markers at the same position.

use serde::Serialize;
use thiserror::Error;

use vibepoint_models::{format_clock, BreakPoint};

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayoutError {
    #[error("Invalid timeline duration: {0}")]
    InvalidDuration(f64),
}

/// Horizontal extent of a segment, both values in percent of the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpanLayout {
    pub left_percent: f64,
    pub width_percent: f64,
}

/// Position of `timestamp_sec` on a track of `total_sec`, in [0, 100].
pub fn position_percent(timestamp_sec: f64, total_sec: f64) -> LayoutResult<f64> {
    let total = validate_total(total_sec)?;
    Ok(clamp_to_track(timestamp_sec, total) / total * 100.0)
}

/// Layout of the `[start_sec, end_sec]` segment. A reversed segment has zero width.
pub fn span_layout(start_sec: f64, end_sec: f64, total_sec: f64) -> LayoutResult<SpanLayout> {
    let total = validate_total(total_sec)?;
    let start = clamp_to_track(start_sec, total);
    let end = clamp_to_track(end_sec, total);

    Ok(SpanLayout {
        left_percent: start / total * 100.0,
        width_percent: (end - start).max(0.0) / total * 100.0,
    })
}

fn validate_total(total_sec: f64) -> LayoutResult<f64> {
    if total_sec.is_finite() && total_sec > 0.0 {
        Ok(total_sec)
    } else {
        Err(LayoutError::InvalidDuration(total_sec))
    }
}

fn clamp_to_track(timestamp_sec: f64, total: f64) -> f64 {
    if timestamp_sec.is_finite() {
        timestamp_sec.clamp(0.0, total)
    } else {
        0.0
    }
}

/// A breakpoint marker placed on the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayout {
    pub breakpoint_id: String,
    pub timestamp_sec: f64,
    pub percent: f64,
    /// `m:ss` label of the timestamp
    pub clock: String,
}

/// The window an inserted ad would occupy, starting at its breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdWindowLayout {
    pub breakpoint_id: String,
    pub span: SpanLayout,
}

/// Complete layout of one render: every marker plus the ad windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub total_sec: f64,
    pub markers: Vec<MarkerLayout>,
    pub ad_windows: Vec<AdWindowLayout>,
}

impl TimelineLayout {
    /// Lay out `breakpoints` on a track of `total_sec`. Input order is kept.
    pub fn build(total_sec: f64, breakpoints: &[BreakPoint]) -> LayoutResult<Self> {
        let total = validate_total(total_sec)?;

        let mut markers = Vec::with_capacity(breakpoints.len());
        let mut ad_windows = Vec::new();

        for bp in breakpoints {
            markers.push(MarkerLayout {
                breakpoint_id: bp.id.clone(),
                timestamp_sec: bp.timestamp_sec,
                percent: position_percent(bp.timestamp_sec, total)?,
                clock: format_clock(clamp_to_track(bp.timestamp_sec, total)),
            });

            if let Some(ad) = bp.recommended_ad.as_ref().filter(|ad| ad.duration_sec > 0.0) {
                ad_windows.push(AdWindowLayout {
                    breakpoint_id: bp.id.clone(),
                    span: span_layout(bp.timestamp_sec, bp.timestamp_sec + ad.duration_sec, total)?,
                });
            }
        }

        Ok(Self {
            total_sec: total,
            markers,
            ad_windows,
        })
    }

    pub fn end_clock(&self) -> String {
        format_clock(self.total_sec)
    }
}
