//! Synchronous cache presence index
//!
//! A derived view of which subjects have a usable cached document. It is
//! rebuilt from the local store at startup and after each batch, and is
//! only ever extended after a durable write, so UI code can query it
//! without awaiting the store.

use std::collections::HashSet;

use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct CacheIndex {
    present: RwLock<HashSet<String>>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index
    pub fn rebuild<I>(&self, subject_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let rebuilt: HashSet<String> = subject_ids.into_iter().collect();
        *self.present.write() = rebuilt;
    }

    pub fn insert(&self, subject_id: &str) {
        self.present.write().insert(subject_id.to_string());
    }

    pub fn remove(&self, subject_id: &str) -> bool {
        self.present.write().remove(subject_id)
    }

    pub fn clear(&self) {
        self.present.write().clear();
    }

    pub fn contains(&self, subject_id: &str) -> bool {
        self.present.read().contains(subject_id)
    }

    pub fn len(&self) -> usize {
        self.present.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.read().is_empty()
    }
}
