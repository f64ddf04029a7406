//! Port interfaces for sync operations

use async_trait::async_trait;
use docsync_domain::{CatalogEntry, FetchError, Result};

/// Downloads one binary document
#[async_trait]
pub trait BinaryFetcher: Send + Sync {
    /// Fetch the full body behind `source_url`.
    ///
    /// Failures must distinguish lost connectivity
    /// ([`FetchError::is_network_loss`]) from unusable responses.
    async fn fetch(&self, source_url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Reports device connectivity
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    /// Resolve once the monitor reports online; immediately if it already
    /// does.
    async fn wait_until_online(&self);

    /// Resolve at the next reported status change.
    async fn changed(&self);
}

/// Point-in-time snapshot of the remote catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<CatalogEntry>>;
}
