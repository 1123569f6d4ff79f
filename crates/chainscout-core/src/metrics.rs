//! Global atomic counters for discovery observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. on shutdown or a reporting tick).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::QueryStatus;

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed atomic counters, safe to bump from any task.
pub struct Metrics {
    searches: AtomicU64,
    network_successes: AtomicU64,
    network_errors: AtomicU64,
    network_timeouts: AtomicU64,
    network_unavailable: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            searches: AtomicU64::new(0),
            network_successes: AtomicU64::new(0),
            network_errors: AtomicU64::new(0),
            network_timeouts: AtomicU64::new(0),
            network_unavailable: AtomicU64::new(0),
        }
    }

    /// Increment the searches counter by one.
    pub fn inc_searches(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "searches", "counter incremented");
    }

    /// Count one per-network outcome under its status.
    pub fn record_outcome(&self, status: QueryStatus) {
        let counter = match status {
            QueryStatus::Success => &self.network_successes,
            QueryStatus::Error => &self.network_errors,
            QueryStatus::Timeout => &self.network_timeouts,
            QueryStatus::Unavailable => &self.network_unavailable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "network_outcome", status = %status, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            searches = self.searches(),
            network_successes = self.network_successes(),
            network_errors = self.network_errors(),
            network_timeouts = self.network_timeouts(),
            network_unavailable = self.network_unavailable(),
        );
    }

    pub fn searches(&self) -> u64 {
        self.searches.load(Ordering::Relaxed)
    }

    pub fn network_successes(&self) -> u64 {
        self.network_successes.load(Ordering::Relaxed)
    }

    pub fn network_errors(&self) -> u64 {
        self.network_errors.load(Ordering::Relaxed)
    }

    pub fn network_timeouts(&self) -> u64 {
        self.network_timeouts.load(Ordering::Relaxed)
    }

    pub fn network_unavailable(&self) -> u64 {
        self.network_unavailable.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.searches.store(0, Ordering::Relaxed);
        self.network_successes.store(0, Ordering::Relaxed);
        self.network_errors.store(0, Ordering::Relaxed);
        self.network_timeouts.store(0, Ordering::Relaxed);
        self.network_unavailable.store(0, Ordering::Relaxed);
    }
}
