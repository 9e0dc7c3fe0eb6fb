//! Plain-text rendering for the terminal.
//!
//! The timeline is drawn as a single ASCII track:
//!
//! ```text
//! 0:00 [----------|=====-----] 1:00
//!                 1
//! ```
//!
//! `|` marks a breakpoint, `=` the window its ad would occupy, and the line
//! below numbers the markers to match the placement cards.

use std::fmt::Write as _;

use vibepoint_models::{format_clock, BreakPoint, IndexSchema, VideoRecord};

use crate::timeline::TimelineLayout;

/// Default track width in characters.
pub const TRACK_WIDTH: usize = 60;

const MIN_TRACK_WIDTH: usize = 2;

/// Draw `layout` on a track of `width` characters.
pub fn render_timeline(layout: &TimelineLayout, width: usize) -> String {
    let width = width.max(MIN_TRACK_WIDTH);
    let column = |percent: f64| -> usize {
        let col = (percent.clamp(0.0, 100.0) / 100.0 * (width - 1) as f64).round() as usize;
        col.min(width - 1)
    };

    let mut track = vec!['-'; width];
    for window in &layout.ad_windows {
        let start = column(window.span.left_percent);
        let end = column(window.span.left_percent + window.span.width_percent);
        for cell in &mut track[start..=end] {
            *cell = '=';
        }
    }
    for marker in &layout.markers {
        track[column(marker.percent)] = '|';
    }

    let start_label = format_clock(0.0);
    let prefix = format!("{} [", start_label);

    let mut labels = vec![' '; width];
    for (i, marker) in layout.markers.iter().enumerate() {
        let number: Vec<char> = (i + 1).to_string().chars().collect();
        let col = column(marker.percent);
        let end = col + number.len();
        // Skip numbers that would overlap a previous one or run off the track
        let free = end <= width
            && labels[col..end].iter().all(|c| *c == ' ')
            && (col == 0 || labels[col - 1] == ' ');
        if free {
            labels[col..end].copy_from_slice(&number);
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{}] {}",
        prefix,
        track.iter().collect::<String>(),
        layout.end_clock()
    );
    let label_line: String = labels.iter().collect();
    out.push_str(format!("{}{}", " ".repeat(prefix.len()), label_line).trim_end());
    out
}

/// One card per breakpoint, numbered like the timeline markers.
pub fn render_cards(breakpoints: &[BreakPoint]) -> String {
    let mut out = String::new();

    for (i, bp) in breakpoints.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let label = bp.label.clone().unwrap_or_else(|| bp.id.clone());
        let _ = writeln!(out, "[{}] {} at {}", i + 1, label, format_clock(bp.timestamp_sec));

        let Some(ad) = &bp.recommended_ad else {
            let _ = writeln!(out, "    No ad recommended");
            continue;
        };

        let mut headline = format!("    {} by {}", ad.title, ad.brand);
        if ad.duration_sec > 0.0 {
            let _ = write!(headline, ", {}", format_clock(ad.duration_sec));
        }
        if let Some(score) = ad.match_score_percent {
            let _ = write!(headline, ", match {}%", score.round());
        }
        let _ = writeln!(out, "{}", headline);
        let _ = writeln!(out, "    Why: {}", ad.rationale);

        if !ad.video_tags.is_empty() {
            let _ = writeln!(out, "    Video themes: {}", ad.video_tags.join(", "));
        }
        if !ad.ad_tags.is_empty() {
            let _ = writeln!(out, "    Ad keywords: {}", ad.ad_tags.join(", "));
        }
        if ad.has_matches() {
            let _ = writeln!(out, "    Matching: {}", ad.matching_terms.join(", "));
        }
        if let Some(url) = &ad.thumbnail_url {
            let _ = writeln!(out, "    Thumbnail: {}", url);
        }
    }

    out
}

/// Timeline followed by the cards.
pub fn render_placements(layout: &TimelineLayout, breakpoints: &[BreakPoint], width: usize) -> String {
    if breakpoints.is_empty() {
        return "No ad placements suggested.\n".to_string();
    }
    format!("{}\n\n{}", render_timeline(layout, width), render_cards(breakpoints))
}

pub fn render_indexes(indexes: &[IndexSchema]) -> String {
    if indexes.is_empty() {
        return "No indexes found.\n".to_string();
    }

    let mut out = String::new();
    for index in indexes {
        let name = if index.name.is_empty() { "(unnamed)" } else { index.name.as_str() };
        match index.video_count {
            Some(count) => {
                let _ = writeln!(out, "{}  {}  {} videos", index.id, name, count);
            }
            None => {
                let _ = writeln!(out, "{}  {}", index.id, name);
            }
        }
    }
    out
}

/// One line per video: id, title, duration and indexing status.
pub fn render_videos(videos: &[VideoRecord], default_duration_sec: f64) -> String {
    if videos.is_empty() {
        return "No videos found.\n".to_string();
    }

    let mut out = String::new();
    for video in videos {
        let _ = writeln!(
            out,
            "{}  {}  {}  {}",
            video.id,
            video.display_title(),
            format_clock(video.effective_duration_sec(default_duration_sec)),
            video.status_label()
        );
    }
    out
}
