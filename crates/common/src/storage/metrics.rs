//! Connection pool activity counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of [`StorageMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolActivity {
    pub acquired: u64,
    pub timeouts: u64,
    pub errors: u64,
    pub avg_wait_ms: u64,
}

/// Lock-free counters updated on every checkout
#[derive(Debug)]
pub struct StorageMetrics {
    acquired: AtomicU64,
    timeouts: AtomicU64,
    errors: AtomicU64,
    wait_ms_total: AtomicU64,
    max_pool_size: u32,
}

impl StorageMetrics {
    pub fn new(max_pool_size: u32) -> Self {
        Self {
            acquired: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            wait_ms_total: AtomicU64::new(0),
            max_pool_size,
        }
    }

    pub fn record_connection_acquired(&self, wait_ms: u64) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        self.wait_ms_total.fetch_add(wait_ms, Ordering::Relaxed);
    }

    pub fn record_connection_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolActivity {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let wait_ms_total = self.wait_ms_total.load(Ordering::Relaxed);

        PoolActivity {
            acquired,
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            avg_wait_ms: wait_ms_total.checked_div(acquired).unwrap_or(0),
        }
    }

    pub fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }
}
