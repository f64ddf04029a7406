//! HTTP implementation of the binary fetcher port.
//!
//! Maps transport outcomes onto [`FetchError`] so the orchestrator can tell
//! lost connectivity (pause and retry the item) from an unusable response
//! (fail the item for this batch).

use std::time::Duration;

use async_trait::async_trait;
use docsync_core::BinaryFetcher;
use docsync_domain::{DocSyncError, FetchError};
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::http::{HttpClient, SendError};

/// Downloads document bodies with a plain `GET`.
#[derive(Clone)]
pub struct HttpBinaryFetcher {
    client: HttpClient,
}

impl HttpBinaryFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build a fetcher whose per-request timeout matches `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DocSyncError> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .max_attempts(2)
            .user_agent(concat!("docsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client))
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.client.timeout().as_millis()).unwrap_or(u64::MAX)
    }

    fn map_transport(&self, err: &reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_ms())
        } else if err.is_decode() {
            FetchError::Content(format!("failed to decode body: {err}"))
        } else {
            // Connect, request and mid-body I/O failures all look like the
            // network going away.
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl BinaryFetcher for HttpBinaryFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(source_url)
            .map_err(|err| FetchError::Content(format!("invalid source url: {err}")))?;

        let request = self.client.request(Method::GET, url);
        let response = match self.client.try_send(request).await {
            Ok(response) => response,
            Err(SendError::Transport(err)) => return Err(self.map_transport(&err)),
            Err(SendError::Build(message)) => return Err(FetchError::Content(message)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body = response.bytes().await.map_err(|err| self.map_transport(&err))?;
        if body.is_empty() {
            return Err(FetchError::Content("empty document".into()));
        }

        debug!(bytes = body.len(), "document downloaded");
        Ok(body.to_vec())
    }
}

/// Any response that arrived is a content failure; only transport errors
/// count as network loss.
fn classify_status(status: StatusCode) -> FetchError {
    FetchError::Http {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("unknown status").to_string(),
    }
}
