//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use docsync_core::SyncEngine;
use docsync_domain::constants::DEFAULT_CATALOG_FILE;
use docsync_domain::{Config, DocSyncError, HealthCheckResult, Result};
use docsync_infra::config;
use docsync_infra::{
    ConnectivityProbe, HttpBinaryFetcher, JsonFileCatalog, NetworkStatus, ProbeConfig,
    SqliteLocalStore,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const PROBE_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Application context - holds the engine and its adapters
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteLocalStore>,
    pub network: NetworkStatus,
    pub engine: Arc<SyncEngine>,

    // Connectivity probe, present when `sync.probe_url` is configured
    probe: Mutex<Option<ConnectivityProbe>>,
}

impl AppContext {
    /// Create a context from the environment or a probed config file
    pub async fn new() -> Result<Self> {
        let config = config::load()?;
        Self::new_with_config(config).await
    }

    /// Create a context with custom configuration
    ///
    /// The store is opened lazily by the first operation, so a broken
    /// database never prevents construction; [`AppContext::boot`] surfaces
    /// it through the health result instead.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteLocalStore::from_config(&config.database));
        let fetcher = Arc::new(HttpBinaryFetcher::with_timeout(config.sync.fetch_timeout())?);
        let network = NetworkStatus::default();

        let catalog_path =
            config.sync.catalog_path.clone().unwrap_or_else(|| DEFAULT_CATALOG_FILE.to_string());
        let catalog = Arc::new(JsonFileCatalog::new(catalog_path));

        let engine = Arc::new(SyncEngine::new(
            store.clone(),
            fetcher,
            Arc::new(network.clone()),
            catalog,
            &config.sync,
        ));

        let probe = match config.sync.probe_url.as_deref() {
            Some(url) => Some(start_probe(url, config.sync.probe_interval(), &network).await?),
            None => None,
        };

        info!(
            db_path = %config.database.path,
            probe = probe.is_some(),
            "Application context created"
        );

        Ok(Self { config, store, network, engine, probe: Mutex::new(probe) })
    }

    /// Startup verification: open the store, rebuild the presence index, and
    /// report unfinished work.
    pub async fn boot(&self) -> HealthCheckResult {
        let health = self.engine.check_health().await;

        if !health.healthy {
            error!(
                db_accessible = health.db_accessible,
                error = health.error.as_deref().unwrap_or_default(),
                "Local storage unavailable, manual reset required"
            );
        } else if health.has_pending_sync {
            info!(pending_count = health.pending_count, "Unfinished sync batch awaiting resume");
        }

        health
    }

    /// True while the connectivity probe worker runs
    pub async fn probe_running(&self) -> bool {
        self.probe.lock().await.as_ref().is_some_and(ConnectivityProbe::is_running)
    }

    /// Shut the context down gracefully
    ///
    /// Stops the connectivity probe. A running batch is left to the runtime:
    /// its intent is durable and resumes on the next start.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        if let Some(probe) = self.probe.lock().await.as_mut() {
            if probe.is_running() {
                probe.stop().await.map_err(|e| {
                    warn!(error = %e, "failed to stop connectivity probe");
                    DocSyncError::Internal(format!("failed to stop connectivity probe: {e}"))
                })?;
            }
        }

        if self.engine.orchestrator().is_running() {
            info!("Sync batch still running at shutdown; it resumes on next start");
        }

        Ok(())
    }
}

async fn start_probe(
    url: &str,
    interval: Duration,
    network: &NetworkStatus,
) -> Result<ConnectivityProbe> {
    let mut probe =
        ConnectivityProbe::new(ProbeConfig::new(url, interval), network.clone()).map_err(|e| {
            error!(error = %e, "failed to construct connectivity probe");
            DocSyncError::Config(format!("failed to construct connectivity probe: {e}"))
        })?;

    // Fail fast on startup
    tokio::time::timeout(PROBE_START_TIMEOUT, probe.start())
        .await
        .map_err(|_| {
            error!(timeout_secs = PROBE_START_TIMEOUT.as_secs(), "connectivity probe start timed out");
            DocSyncError::Internal("connectivity probe start timed out".into())
        })?
        .map_err(|e| {
            error!(error = %e, "failed to start connectivity probe");
            DocSyncError::Internal(format!("failed to start connectivity probe: {e}"))
        })?;

    Ok(probe)
}
