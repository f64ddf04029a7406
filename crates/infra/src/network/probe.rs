//! Connectivity probe worker.
//!
//! Polls a URL with `HEAD` requests and feeds the outcome into a
//! [`NetworkStatus`]. Any HTTP response counts as online; only transport
//! failures count as offline. The worker tracks its join handle, cancels
//! explicitly, and bounds shutdown with a join timeout.

use std::time::Duration;

use reqwest::Method;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::status::NetworkStatus;
use crate::http::HttpClient;

/// Configuration for the connectivity probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// URL answered by any reachable server
    pub url: String,
    /// Interval between probes
    pub interval: Duration,
    /// Timeout of a single probe request
    pub request_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl ProbeConfig {
    pub fn new(url: impl Into<String>, interval: Duration) -> Self {
        Self {
            url: url.into(),
            interval,
            request_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Lifecycle errors of the probe worker.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connectivity probe already running")]
    AlreadyRunning,

    #[error("connectivity probe not running")]
    NotRunning,

    #[error("connectivity probe task panicked: {0}")]
    TaskPanicked(String),

    #[error("connectivity probe did not stop within {0:?}")]
    JoinTimeout(Duration),

    #[error("failed to build probe client: {0}")]
    Client(String),
}

/// Background worker that keeps a [`NetworkStatus`] current.
pub struct ConnectivityProbe {
    client: HttpClient,
    status: NetworkStatus,
    config: ProbeConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl ConnectivityProbe {
    pub fn new(config: ProbeConfig, status: NetworkStatus) -> Result<Self, ProbeError> {
        let client = HttpClient::builder()
            .timeout(config.request_timeout)
            .max_attempts(1)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            status,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        })
    }

    /// Start the worker, spawning the background polling task.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn start(&mut self) -> Result<(), ProbeError> {
        if self.is_running() {
            return Err(ProbeError::AlreadyRunning);
        }

        info!("Starting connectivity probe");

        // Create fresh cancellation token
        self.cancellation = CancellationToken::new();

        let client = self.client.clone();
        let status = self.status.clone();
        let url = self.config.url.clone();
        let interval = self.config.interval;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(client, status, url, interval, cancel).await;
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    /// Stop the worker and wait for the polling task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), ProbeError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(ProbeError::NotRunning);
        };

        info!("Stopping connectivity probe");
        self.cancellation.cancel();

        let join_timeout = self.config.join_timeout;
        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Probe task panicked: {}", e);
                return Err(ProbeError::TaskPanicked(e.to_string()));
            }
            Err(_) => {
                warn!("Probe task did not complete within timeout");
                return Err(ProbeError::JoinTimeout(join_timeout));
            }
        }

        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a worker instance is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Run a single probe and record the result.
    pub async fn probe_once(&self) -> bool {
        Self::check(&self.client, &self.status, &self.config.url).await
    }

    async fn poll_loop(
        client: HttpClient,
        status: NetworkStatus,
        url: String,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Connectivity probe loop cancelled");
                    break;
                }
                _ = Self::check(&client, &status, &url) => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Connectivity probe loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    async fn check(client: &HttpClient, status: &NetworkStatus, url: &str) -> bool {
        let online = match client.try_send(client.request(Method::HEAD, url)).await {
            Ok(response) => {
                debug!(status = %response.status(), "probe reached server");
                true
            }
            Err(err) => {
                debug!(error = %err, "probe failed");
                false
            }
        };
        status.set_online(online);
        online
    }
}

impl Drop for ConnectivityProbe {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ConnectivityProbe dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}
