//! Upload ticket models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::timestamp::parse_datetime;

/// Maximum filename length accepted by the upload endpoint.
pub const MAX_FILENAME_LEN: usize = 255;

/// `POST /upload` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
}

/// `POST /upload` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub s3_path: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A pre-signed write grant for one upload.
///
/// Consumed once by the upload pipeline and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTicket {
    /// Pre-signed PUT target
    pub write_url: Url,
    /// Object key the backend reads the video from
    pub read_path: String,
    /// When the write grant stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl UploadTicket {
    /// Build a ticket from the wire response.
    ///
    /// `expires_at` wins when it parses; otherwise the expiry is derived from
    /// `expires_in` relative to `now`. An `expires_in` too large to represent
    /// yields a ticket that is already expired.
    pub fn from_response(resp: UploadUrlResponse, now: DateTime<Utc>) -> Result<Self, url::ParseError> {
        let write_url = Url::parse(&resp.upload_url)?;
        let expires_at = resp
            .expires_at
            .as_deref()
            .and_then(parse_datetime)
            .unwrap_or_else(|| expiry_after(now, resp.expires_in.unwrap_or(0)));

        Ok(Self {
            write_url,
            read_path: resp.s3_path,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn expiry_after(now: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    i64::try_from(expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(now)
}

/// Validate and normalize an upload filename.
///
/// Mirrors the backend rules so obviously bad names never cost a round trip.
pub fn validate_filename(filename: &str) -> Result<String, String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err("filename cannot be empty".to_string());
    }
    if !trimmed.contains('.') {
        return Err("filename must include extension".to_string());
    }
    if trimmed.len() > MAX_FILENAME_LEN {
        return Err(format!("filename too long (max {} chars)", MAX_FILENAME_LEN));
    }
    Ok(trimmed.to_string())
}
