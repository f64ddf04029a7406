//! Observable orchestrator state
//!
//! Every state change is pushed both to a `watch` channel for async
//! consumers and to synchronous listeners registered with
//! [`StateHub::subscribe`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use docsync_domain::SyncState;
use parking_lot::Mutex;
use tokio::sync::watch;

type Listener = Arc<dyn Fn(&SyncState) + Send + Sync>;
type ListenerMap = Mutex<BTreeMap<u64, Listener>>;

/// Publishes [`SyncState`] snapshots
pub struct StateHub {
    tx: watch::Sender<SyncState>,
    listeners: Arc<ListenerMap>,
    next_id: AtomicU64,
}

impl StateHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SyncState::idle());
        Self { tx, listeners: Arc::new(Mutex::new(BTreeMap::new())), next_id: AtomicU64::new(1) }
    }

    /// Latest published snapshot
    pub fn current(&self) -> SyncState {
        self.tx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.tx.subscribe()
    }

    /// Replace the snapshot and notify everyone.
    ///
    /// Listeners run on the publishing task, outside the registry lock, so
    /// a listener may subscribe or unsubscribe while being called.
    pub fn publish(&self, state: SyncState) {
        self.tx.send_replace(state.clone());

        let listeners: Vec<Listener> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(&state);
        }
    }

    /// Publish a modified copy of the current snapshot
    pub fn update(&self, apply: impl FnOnce(&mut SyncState)) -> SyncState {
        let mut state = self.current();
        apply(&mut state);
        self.publish(state.clone());
        state
    }

    /// Register a listener. It is called once right away with the current
    /// snapshot, then for every publication until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncState) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        self.listeners.lock().insert(id, Arc::clone(&listener));

        listener(&self.current());

        Subscription { id, listeners: Arc::downgrade(&self.listeners) }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered listener; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
