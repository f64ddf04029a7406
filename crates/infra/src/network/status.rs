//! Shared connectivity flag
//!
//! The host (or the [`ConnectivityProbe`](super::ConnectivityProbe)) flips the
//! flag; the orchestrator reads it through [`ConnectivityMonitor`].

use std::sync::Arc;

use async_trait::async_trait;
use docsync_core::ConnectivityMonitor;
use tokio::sync::watch;
use tracing::info;

/// Connectivity state backed by a `watch` channel.
#[derive(Clone, Debug)]
pub struct NetworkStatus {
    tx: Arc<watch::Sender<bool>>,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Record the current connectivity. Returns true when it changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            info!(online, "connectivity changed");
        }
        changed
    }

    /// Receiver for hosts that want to observe transitions directly.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ConnectivityMonitor for NetworkStatus {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    async fn wait_until_online(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only resolves on `true`.
        let _ = rx.wait_for(|online| *online).await;
    }

    async fn changed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.changed().await;
    }
}
