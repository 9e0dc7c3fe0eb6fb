//! One-shot suggestion flow: fetch, reconcile, lay out, render.

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use serde_json::json;
use vibepoint_models::VideoId;
use vibepoint_workflow::{GapReason, WorkflowError};

use super::{not_ready_body, session_for, suggestions_body, video_body, AD_INDEX};

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/12/index/{}/video/ad-1", AD_INDEX)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(video_body("ad-1", Some("coffee.mp4"), Some(15.0))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/12/index/{}/video/ad-2", AD_INDEX)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Video not found" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/12/index/creators/video/creator-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body("creator-1", None, Some(120.0))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_suggest_builds_full_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .and(body_json(json!({ "video_id": "creator-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(suggestions_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let session = session_for(&server);
    let report = session
        .suggest(&VideoId::from("creator-1"), Some("creators"))
        .await
        .unwrap();

    assert_eq!(report.duration_sec, 120.0);

    assert_eq!(report.ads.len(), 2);
    assert_eq!(report.ads[0].match_score, Some(70.0));
    assert_eq!(report.ads[0].placement_timestamp_sec, 30.0);
    assert_eq!(report.ads[0].resolved_ad_video.as_ref().unwrap().id, "ad-1");
    assert_eq!(report.ads[1].match_score, Some(55.0));
    assert_eq!(report.ads[1].placement_timestamp_sec, 90.0);
    assert!(report.ads[1].placement.is_none());

    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].index, 1);
    assert_eq!(report.gaps[0].ad_id.as_deref(), Some("ad-2"));
    assert!(matches!(report.gaps[0].reason, GapReason::LookupFailed(_)));

    let first = report.breakpoints[0].recommended_ad.as_ref().unwrap();
    assert_eq!(first.title, "coffee.mp4");
    assert_eq!(first.duration_sec, 15.0);
    assert_eq!(first.rationale, "Scene change after intro");
    assert_eq!(first.matching_terms, vec!["Travel".to_string()]);

    let second = report.breakpoints[1].recommended_ad.as_ref().unwrap();
    assert_eq!(second.title, "Legacy Spot");
    assert_eq!(second.rationale, "Calm outro");
    assert_eq!(second.duration_sec, 0.0);

    assert_eq!(report.layout.markers[0].percent, 25.0);
    assert_eq!(report.layout.markers[1].percent, 75.0);
    assert_eq!(report.layout.ad_windows.len(), 1);
    assert_eq!(report.layout.ad_windows[0].span.left_percent, 25.0);
    assert_eq!(report.layout.ad_windows[0].span.width_percent, 12.5);

    let rendered = report.render(40);
    assert!(rendered.starts_with("0:00 ["));
    assert!(rendered.contains("] 2:00"));
    assert!(rendered.contains("[1] Ad Break 1 at 0:30"));
    assert!(rendered.contains("coffee.mp4 by Advertiser, 0:15, match 70%"));
    assert!(rendered.contains("[2] Ad Break 2 at 1:30"));
    assert!(rendered.contains("Ad 2 (ad-2): catalog lookup failed"));
}

#[tokio::test]
async fn test_suggest_without_creator_index_uses_default_duration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(suggestions_body()))
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let session = session_for(&server);
    let report = session.suggest(&VideoId::from("creator-1"), None).await.unwrap();

    assert_eq!(report.duration_sec, 180.0);
    assert!((report.layout.markers[0].percent - 30.0 / 180.0 * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_suggest_not_ready_surfaces_distinct_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_ready_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let err = session
        .suggest(&VideoId::from("creator-1"), None)
        .await
        .unwrap_err();

    assert!(err.is_not_ready());
    assert!(matches!(err, WorkflowError::Gateway(_)));
    assert!(err.user_message().contains("still processing"));
}

#[tokio::test]
async fn test_empty_suggestions_render_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_id": "creator-1",
            "suggested_ads": [],
            "placement_count": 0
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let report = session.suggest(&VideoId::from("creator-1"), None).await.unwrap();

    assert!(report.ads.is_empty());
    assert!(report.gaps.is_empty());
    assert_eq!(report.render_default(), "No ad placements suggested.\n");
}
