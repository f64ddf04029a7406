use async_trait::async_trait;
use docsync_core::ConnectivityMonitor;
use tokio::sync::watch;

/// Connectivity flag flipped by the test
pub struct FakeConnectivity {
    tx: watch::Sender<bool>,
}

impl FakeConnectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    pub fn set_online(&self, online: bool) {
        self.tx.send_replace(online);
    }
}

#[async_trait]
impl ConnectivityMonitor for FakeConnectivity {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    async fn wait_until_online(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|online| *online).await;
    }

    async fn changed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.changed().await;
    }
}
