//! Track loading
//!
//! The engine sees loading as one async operation: URL in, decoded buffer
//! out. `HttpLoader` is the production implementation; tests substitute
//! their own.

use crate::audio::decoder::SimpleDecoder;
use crate::audio::types::DecodedBuffer;
use crate::error::LoadError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("segue-player/", env!("CARGO_PKG_VERSION"));

/// Fetch-and-decode seam between the engine and the outside world
#[async_trait]
pub trait AudioLoader: Send + Sync {
    /// Fetch `url` and decode it fully
    async fn load(&self, url: &str) -> Result<Arc<DecodedBuffer>, LoadError>;
}

/// Loads tracks over HTTP(S), or from the local filesystem for `file://`
/// URLs and bare paths.
pub struct HttpLoader {
    http_client: reqwest::Client,
}

impl HttpLoader {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::network(e.to_string()))?;

        Ok(Self { http_client })
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::network(e.to_string()))?;

        if let Some(err) = status_error(url, response.status()) {
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::network(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::not_found(format!("{}: {}", path, e)),
            _ => LoadError::network(format!("{}: {}", path, e)),
        })
    }
}

/// Classify a non-success HTTP status
///
/// Timeouts, rate limiting and server errors are transient and map to
/// `Network`, which the engine retries. Every other failure status maps to
/// `NotFound`: that includes 401 and 403, since an expired or unauthorized
/// signed URL fails the same way on a retry.
fn status_error(url: &str, status: reqwest::StatusCode) -> Option<LoadError> {
    use reqwest::StatusCode;

    if status.is_success() {
        return None;
    }
    let message = format!("{} returned {}", url, status);
    let transient = status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS;
    Some(if transient {
        LoadError::network(message)
    } else {
        LoadError::not_found(message)
    })
}

#[async_trait]
impl AudioLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<Arc<DecodedBuffer>, LoadError> {
        debug!(url = %url, "Fetching track");

        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url).await?
        } else {
            self.fetch_file(url.strip_prefix("file://").unwrap_or(url)).await?
        };

        let extension = SimpleDecoder::extension_hint(url).map(str::to_string);
        let buffer = tokio::task::spawn_blocking(move || {
            SimpleDecoder::decode_bytes(bytes, extension.as_deref())
        })
        .await
        .map_err(|e| LoadError::unsupported_format(format!("Decoder task failed: {}", e)))??;

        Ok(Arc::new(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;

    #[tokio::test]
    async fn test_missing_local_file_is_not_found() {
        let loader = HttpLoader::new(Duration::from_secs(5)).unwrap();
        let err = loader.load("file:///nonexistent/segue/track.mp3").await.unwrap_err();
        assert_eq!(err.kind, LoadErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_local_garbage_is_unsupported_format() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not audio at all").unwrap();

        let loader = HttpLoader::new(Duration::from_secs(5)).unwrap();
        let err = loader.load(file.path().to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.kind, LoadErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_status_classification() {
        use reqwest::StatusCode;

        let kind = |code: u16| {
            status_error("https://cdn.test/a.mp3", StatusCode::from_u16(code).unwrap()).map(|e| e.kind)
        };

        assert_eq!(kind(200), None);
        assert_eq!(kind(206), None);
        for code in [500, 502, 503, 408, 429] {
            assert_eq!(kind(code), Some(LoadErrorKind::Network), "status {}", code);
        }
        for code in [404, 410, 401, 403, 400] {
            assert_eq!(kind(code), Some(LoadErrorKind::NotFound), "status {}", code);
        }
    }
}
