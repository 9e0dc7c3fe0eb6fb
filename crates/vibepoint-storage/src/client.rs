//! Pre-signed upload client implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{StorageError, StorageResult};

/// Content type the backend signs into upload grants. A PUT with any other
/// `Content-Type` fails signature validation.
pub const SIGNED_CONTENT_TYPE: &str = "video/*";

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi", "m4v"];

/// Byte progress callback, receives `(bytes_sent, total_bytes)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Writes a local file to object storage through a pre-signed URL.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Upload `path` to `write_url`. Returns the number of bytes sent.
    async fn put_object(
        &self,
        write_url: &Url,
        path: &Path,
        content_type: &str,
        progress: Option<ProgressFn>,
    ) -> StorageResult<u64>;
}

/// Streams files to pre-signed PUT URLs.
#[derive(Clone)]
pub struct PresignedUploader {
    http: Client,
}

impl PresignedUploader {
    /// Create an uploader. Large videos take a while, so only the connect
    /// phase is bounded.
    pub fn new(connect_timeout: Duration) -> StorageResult<Self> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("vibepoint-storage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ObjectUploader for PresignedUploader {
    async fn put_object(
        &self,
        write_url: &Url,
        path: &Path,
        content_type: &str,
        progress: Option<ProgressFn>,
    ) -> StorageResult<u64> {
        if !matches!(write_url.scheme(), "http" | "https") {
            return Err(StorageError::invalid_url(format!(
                "unsupported upload URL scheme '{}'",
                write_url.scheme()
            )));
        }

        let file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();
        debug!("Uploading {} ({} bytes) to {}", path.display(), total, public_url(write_url));

        let mut sent = 0u64;
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let (Ok(bytes), Some(report)) = (&chunk, &progress) {
                sent += bytes.len() as u64;
                report(sent, total);
            }
            chunk
        });

        let response = self
            .http
            .put(write_url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Object storage rejected upload");
            return Err(StorageError::upload_failed(format!(
                "storage returned {}: {}",
                status, body
            )));
        }

        info!("Uploaded {} ({} bytes)", path.display(), total);
        Ok(total)
    }
}

/// Publicly fetchable URL of the uploaded object: the signed URL without its
/// query string and fragment.
pub fn public_url(write_url: &Url) -> Url {
    let mut url = write_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// True for file extensions the backend can index.
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_video(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_public_url_strips_signature() {
        let signed = Url::parse(
            "https://bucket.s3.us-east-1.amazonaws.com/upload/abc.mp4?X-Amz-Signature=dead&X-Amz-Expires=1800#frag",
        )
        .unwrap();
        assert_eq!(
            public_url(&signed).as_str(),
            "https://bucket.s3.us-east-1.amazonaws.com/upload/abc.mp4"
        );
    }

    #[test]
    fn test_is_video_path() {
        assert!(is_video_path(Path::new("clip.mp4")));
        assert!(is_video_path(Path::new("/tmp/CLIP.MOV")));
        assert!(!is_video_path(Path::new("notes.txt")));
        assert!(!is_video_path(Path::new("noextension")));
    }

    #[tokio::test]
    async fn test_put_object_streams_file_and_reports_progress() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/upload/abc.mp4"))
            .and(header("content-type", SIGNED_CONTENT_TYPE))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let payload = vec![7u8; 200_000];
        let file = temp_video(&payload);
        let url = Url::parse(&format!("{}/upload/abc.mp4?sig=1", server.uri())).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressFn = Arc::new(move |sent, total| sink.lock().unwrap().push((sent, total)));

        let uploader = PresignedUploader::new(Duration::from_secs(2)).unwrap();
        let sent = uploader
            .put_object(&url, file.path(), SIGNED_CONTENT_TYPE, Some(progress))
            .await
            .unwrap();

        assert_eq!(sent, payload.len() as u64);
        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert_eq!(seen.last().copied(), Some((200_000, 200_000)));
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));

        let received = server.received_requests().await.unwrap();
        assert_eq!(received[0].body.len(), payload.len());
    }

    #[tokio::test]
    async fn test_put_object_non_success_is_upload_failed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("SignatureDoesNotMatch"))
            .mount(&server)
            .await;

        let file = temp_video(b"bytes");
        let url = Url::parse(&format!("{}/upload/abc.mp4", server.uri())).unwrap();
        let uploader = PresignedUploader::new(Duration::from_secs(2)).unwrap();

        let err = uploader
            .put_object(&url, file.path(), SIGNED_CONTENT_TYPE, None)
            .await
            .unwrap_err();
        match err {
            StorageError::UploadFailed(msg) => assert!(msg.contains("SignatureDoesNotMatch")),
            other => panic!("expected upload failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_put_object_missing_file_is_io_error() {
        let uploader = PresignedUploader::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://127.0.0.1:9/upload/x.mp4").unwrap();
        let err = uploader
            .put_object(&url, Path::new("/definitely/not/here.mp4"), SIGNED_CONTENT_TYPE, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_put_object_rejects_non_http_url() {
        let file = temp_video(b"bytes");
        let uploader = PresignedUploader::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse("ftp://example.com/x.mp4").unwrap();
        let err = uploader
            .put_object(&url, file.path(), SIGNED_CONTENT_TYPE, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl(_)));
    }
}
