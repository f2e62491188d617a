//! HTTP transport: streaming downloads and the content-type probe.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::error::DownloadError;

/// Identifies the crate on the wire.
pub const USER_AGENT: &str = concat!("cordgrab/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Shared HTTP client. Cheap to clone; all clones reuse one
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        match Self::new(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "client builder failed, continuing with a bare client");
                Self {
                    inner: reqwest::Client::new(),
                }
            }
        }
    }
}

impl HttpClient {
    pub fn new(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .build()
            .map_err(DownloadError::build)?;
        Ok(Self { inner })
    }

    /// HEAD probe for the content type. Best effort: any failure
    /// reports as unknown rather than aborting resolution.
    pub async fn query_content_type(&self, url: &str) -> Option<String> {
        let response = match self.inner.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "content-type probe failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, DownloadError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }

    /// Streams `url` into `path`, returning the byte count written.
    /// A partially written file is removed on failure.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() || status == StatusCode::NO_CONTENT {
            // Bodyless success statuses cannot yield a file either.
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        match self.stream_to_file(response, url, path).await {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(path).await {
                    warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        url: &str,
        path: &Path,
    ) -> Result<u64, DownloadError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| DownloadError::network(url, e))?;
            writer
                .write_all(&bytes)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            written += bytes.len() as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        debug!(url, path = %path.display(), written, "download complete");
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_new_builds_configured_client() {
        assert!(HttpClient::new(5, 60).is_ok());
    }

    #[test]
    fn test_download_to_file_rejects_invalid_url() {
        let dir = TempDir::new().unwrap();
        let client = HttpClient::default();
        let result = tokio_test::block_on(
            client.download_to_file("not-a-valid-url", &dir.path().join("x.bin")),
        );
        assert!(matches!(result, Err(DownloadError::Network { .. })));
    }

    #[tokio::test]
    async fn test_download_to_file_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pngdata".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("file.png");
        let client = HttpClient::default();
        let written = client
            .download_to_file(&format!("{}/file.png", server.uri()), &target)
            .await
            .unwrap();

        assert_eq!(written, 7);
        assert_eq!(std::fs::read(&target).unwrap(), b"pngdata");
    }

    #[tokio::test]
    async fn test_download_to_file_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing.png");
        let client = HttpClient::default();
        let err = client
            .download_to_file(&format!("{}/missing.png", server.uri()), &target)
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert!(!target.exists(), "no file should be created on rejection");
    }

    #[tokio::test]
    async fn test_download_to_file_rejects_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("empty.bin");
        let client = HttpClient::default();
        let err = client
            .download_to_file(&format!("{}/empty", server.uri()), &target)
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_query_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/asset"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/gif"))
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let mime = client
            .query_content_type(&format!("{}/asset", server.uri()))
            .await;
        assert_eq!(mime.as_deref(), Some("image/gif"));
    }

    #[tokio::test]
    async fn test_query_content_type_error_status_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let mime = client
            .query_content_type(&format!("{}/gone", server.uri()))
            .await;
        assert_eq!(mime, None);
    }
}
