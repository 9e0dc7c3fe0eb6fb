//! End-to-end workflow tests against a mocked backend and object store.

pub mod suggest_tests;
pub mod upload_tests;
pub mod watch_tests;

use std::io::Write;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::MockServer;

use vibepoint_workflow::{PollPolicy, Session, WorkflowConfig};

pub const AD_INDEX: &str = "ads-index";

/// Session pointed at `server` with a fast poll schedule.
pub fn session_for(server: &MockServer) -> Session {
    let mut config = WorkflowConfig::default()
        .with_api_url(&server.uri())
        .expect("mock server URI is valid");
    config.ad_index_id = AD_INDEX.to_string();
    config.poll = PollPolicy::fixed(Duration::from_millis(20)).with_max_attempts(20);

    Session::new(config).expect("session builds")
}

/// A small fake video on disk.
pub fn video_file(bytes: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()
        .expect("temp file");
    file.write_all(&vec![7u8; bytes]).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

pub fn not_ready_body() -> Value {
    json!({
        "detail": {
            "detail": "No ad placements found for this video yet",
            "error_code": "PLACEMENT_NOT_FOUND"
        }
    })
}

/// One clip-based ad with a placement and one legacy ad without.
pub fn suggestions_body() -> Value {
    json!({
        "video_id": "creator-1",
        "suggested_ads": [
            {
                "id": "ad-1",
                "clips": [
                    { "score": 0.8, "start": 3.0, "end": 18.0, "video_id": "ad-1",
                      "confidence": "high", "thumbnail_url": "https://cdn.example.com/t1.jpg" },
                    { "score": 0.6, "start": 20.0, "end": 25.0, "video_id": "ad-1",
                      "confidence": "medium" }
                ]
            },
            {
                "ad_video_id": "ad-2",
                "ad_name": "Legacy Spot",
                "relevance_score": 55,
                "placement_timestamp": 90.0,
                "reasoning": "Calm outro"
            }
        ],
        "placement_count": 2,
        "placements": [
            {
                "timestamp": 30.0,
                "reason": "Scene change after intro",
                "situation_description": "Host walks into a cafe",
                "themes": ["Travel", "food"],
                "ad_keywords": ["travel"]
            }
        ]
    })
}

pub fn video_body(id: &str, filename: Option<&str>, duration: Option<f64>) -> Value {
    json!({
        "id": id,
        "system_metadata": { "filename": filename, "duration": duration },
        "created_at": "2025-10-01T10:00:00Z",
        "indexed_at": "2025-10-01T10:05:00Z"
    })
}
