//! Upload pipeline tests.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vibepoint_models::VideoKind;
use vibepoint_workflow::progress::{channel, ProgressReceiver};
use vibepoint_workflow::{UploadProgress, UploadStage, WorkflowError, UPLOAD_FAILED_TEXT};

use super::{session_for, video_file};

fn drain(receiver: &mut ProgressReceiver) -> Vec<UploadProgress> {
    let mut events = Vec::new();
    while let Some(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

async fn mount_ticket(server: &MockServer, expires_at: &str) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_url": format!("{}/bucket/upload/clip.mp4?X-Amz-Signature=abc123", server.uri()),
            "s3_path": "upload/clip.mp4",
            "expires_at": expires_at,
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_upload_starts_analysis() {
    let server = MockServer::start().await;
    mount_ticket(&server, "2099-01-01T00:00:00Z").await;

    Mock::given(method("PUT"))
        .and(path("/bucket/upload/clip.mp4"))
        .and(header("content-type", "video/*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_json(json!({ "video_path": "upload/clip.mp4", "type": "creator" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-42",
            "video_id": "vid-42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = video_file(4096);
    let session = session_for(&server);
    let (sender, mut receiver) = channel();

    let outcome = session
        .upload(file.path(), VideoKind::Creator, &sender)
        .await
        .unwrap();

    assert_eq!(outcome.read_path, "upload/clip.mp4");
    assert_eq!(outcome.job.video_id.as_str(), "vid-42");
    assert_eq!(outcome.job.job_id.as_deref(), Some("task-42"));
    assert_eq!(
        outcome.stream_url.as_str(),
        format!("{}/bucket/upload/clip.mp4", server.uri())
    );

    let events = drain(&mut receiver);
    assert_eq!(events[0], UploadProgress::Stage(UploadStage::RequestingTicket));
    assert_eq!(events[1], UploadProgress::Stage(UploadStage::Transferring));
    assert!(events.contains(&UploadProgress::Bytes { sent: 4096, total: 4096 }));
    let tail = &events[events.len() - 2..];
    assert_eq!(
        tail,
        &[
            UploadProgress::Stage(UploadStage::StartingAnalysis),
            UploadProgress::Complete
        ]
    );
    assert_eq!(events.last().unwrap().text(), "Upload complete!");
}

#[tokio::test]
async fn test_transfer_failure_never_starts_analysis() {
    let server = MockServer::start().await;
    mount_ticket(&server, "2099-01-01T00:00:00Z").await;

    Mock::given(method("PUT"))
        .and(path("/bucket/upload/clip.mp4"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = video_file(1024);
    let session = session_for(&server);
    let (sender, mut receiver) = channel();

    let err = session
        .upload(file.path(), VideoKind::Creator, &sender)
        .await
        .unwrap_err();

    match &err {
        WorkflowError::UploadFailed { stage, message } => {
            assert_eq!(*stage, UploadStage::Transferring);
            assert!(message.contains("500"));
        }
        other => panic!("expected upload failure, got {:?}", other),
    }
    assert_eq!(err.user_message(), UPLOAD_FAILED_TEXT);

    let events = drain(&mut receiver);
    assert!(!events.contains(&UploadProgress::Stage(UploadStage::StartingAnalysis)));
    match events.last() {
        Some(UploadProgress::Failed { stage, .. }) => assert_eq!(*stage, UploadStage::Transferring),
        other => panic!("expected failure event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_ticket_fails_before_transfer() {
    let server = MockServer::start().await;
    mount_ticket(&server, "2001-01-01T00:00:00Z").await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = video_file(512);
    let session = session_for(&server);
    let (sender, _receiver) = channel();

    let err = session
        .upload(file.path(), VideoKind::Ad, &sender)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::UploadFailed { stage: UploadStage::Transferring, .. }
    ));
}

#[tokio::test]
async fn test_ticket_failure_stops_at_first_stage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Filename must include extension",
            "error_code": "INVALID_FILENAME"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = video_file(16);
    let session = session_for(&server);
    let (sender, mut receiver) = channel();

    let err = session
        .upload(file.path(), VideoKind::Creator, &sender)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::UploadFailed { stage: UploadStage::RequestingTicket, .. }
    ));
    let events = drain(&mut receiver);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].text(), UPLOAD_FAILED_TEXT);
}
