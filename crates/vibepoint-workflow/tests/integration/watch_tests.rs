//! Polling over real HTTP.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vibepoint_models::{AnalysisTarget, VideoId, VideoKind};
use vibepoint_workflow::{PollState, WorkflowError};

use super::{not_ready_body, session_for, suggestions_body, video_body, AD_INDEX};

async fn mount_ad_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/12/index/{}/video/ad-1", AD_INDEX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body("ad-1", Some("coffee.mp4"), Some(15.0))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_watch_polls_through_not_ready_and_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_ready_body()))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video_id": "creator-1",
            "suggested_ads": [],
            "placement_count": 0
        })))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(suggestions_body()))
        .with_priority(3)
        .mount(&server)
        .await;
    mount_ad_catalog(&server).await;

    let session = session_for(&server);
    let mut poller = session.poller();
    let video_id = VideoId::from("creator-1");

    let report = session.watch(&mut poller, &video_id, None).await.unwrap();
    assert_eq!(report.ads.len(), 2);
    assert_eq!(report.breakpoints.len(), 2);

    let snapshot = poller.snapshot();
    assert_eq!(snapshot.state, PollState::Suggesting);
    assert_eq!(snapshot.attempts, 4);
    assert_eq!(snapshot.not_ready, 2);
    assert_eq!(snapshot.empty, 1);
    assert_eq!(snapshot.errors, 0);
}

#[tokio::test]
async fn test_analyze_then_poll() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_json(json!({ "video_id": "creator-1", "type": "creator" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "video_id": "creator-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(suggestions_body()))
        .mount(&server)
        .await;
    mount_ad_catalog(&server).await;

    let session = session_for(&server);
    let mut poller = session.poller();
    let video_id = VideoId::from("creator-1");

    let job = session
        .analyze(&mut poller, &AnalysisTarget::VideoId(video_id.clone()), VideoKind::Creator)
        .await
        .unwrap();
    assert_eq!(job.video_id, video_id);
    assert!(job.job_id.is_none());

    let report = session.await_report(&poller, &job.video_id, None).await.unwrap();
    assert_eq!(report.ads[0].match_score, Some(70.0));
}

#[tokio::test]
async fn test_watch_times_out_when_budget_is_spent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/suggest"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let mut poller = session.poller();

    let err = session
        .watch(&mut poller, &VideoId::from("creator-1"), None)
        .await
        .unwrap_err();

    match err {
        WorkflowError::TimedOut { attempts, .. } => assert_eq!(attempts, 20),
        other => panic!("expected timeout, got {:?}", other),
    }
    let snapshot = poller.snapshot();
    assert_eq!(snapshot.state, PollState::Exhausted);
    assert_eq!(snapshot.errors, 20);
}
