//! Plain-text export fetching for linked documents.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, X_FRAME_OPTIONS};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::links::LinkedDocumentReference;

/// Outcome of resolving a document that the host answered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Exported text. May be empty for an empty document.
    Text(String),
    /// The host refused to serve the export (private or non-existent document).
    Denied,
}

/// Transport-level failure reaching the document host.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Document host returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Export from {url} is not valid UTF-8 text")]
    Decode { url: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Resolves a linked document to its text.
pub trait DocumentFetcher: Send + Sync {
    fn fetch(
        &self,
        reference: &LinkedDocumentReference,
    ) -> impl Future<Output = Result<FetchResult, FetchError>> + Send;
}

impl<T: DocumentFetcher> DocumentFetcher for Arc<T> {
    fn fetch(
        &self,
        reference: &LinkedDocumentReference,
    ) -> impl Future<Output = Result<FetchResult, FetchError>> + Send {
        (**self).fetch(reference)
    }
}

/// Fetches `{base}/document/d/{id}/export?format=txt` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
    base_url: String,
}

impl HttpDocumentFetcher {
    /// Create a fetcher against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Plain-text export URL for a document.
    pub fn export_url(&self, reference: &LinkedDocumentReference) -> String {
        format!(
            "{}/document/d/{}/export?format=txt",
            self.base_url, reference.document_id
        )
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, reference: &LinkedDocumentReference) -> Result<FetchResult, FetchError> {
        let url = self.export_url(reference);
        debug!("Fetching document export {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        // A denial page is reported as Denied whatever its status.
        if is_denied(response.headers()) {
            warn!("Document {} denied by host", reference.document_id);
            return Ok(FetchResult::Denied);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        let text = decode_export_body(&body).ok_or(FetchError::Decode { url })?;

        debug!(
            "Document {} exported {} bytes",
            reference.document_id,
            text.len()
        );
        Ok(FetchResult::Text(text))
    }
}

fn is_denied(headers: &HeaderMap) -> bool {
    headers
        .get(X_FRAME_OPTIONS)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("DENY"))
        .unwrap_or(false)
}

/// Decode an export body: strict UTF-8, leading BOM dropped, line endings as `\n`.
fn decode_export_body(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Some(text.replace("\r\n", "\n").replace('\r', "\n"))
}
