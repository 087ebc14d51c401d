//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Records that passed validation
    validated_count: AtomicU64,
    /// Records rejected with an error set
    rejected_count: AtomicU64,
    /// Instances represented as wire records
    represented_count: AtomicU64,
    /// Instances created or updated through a store
    saved_count: AtomicU64,
    /// Saves that failed at construction or storage
    save_failure_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validated_count(&self) -> u64 {
        self.validated_count.load(Ordering::Relaxed)
    }

    pub fn inc_validated_count(&self) {
        self.validated_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn represented_count(&self) -> u64 {
        self.represented_count.load(Ordering::Relaxed)
    }

    pub fn inc_represented_count(&self) {
        self.represented_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn saved_count(&self) -> u64 {
        self.saved_count.load(Ordering::Relaxed)
    }

    pub fn inc_saved_count(&self) {
        self.saved_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn save_failure_count(&self) -> u64 {
        self.save_failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_save_failure_count(&self) {
        self.save_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validated_count: self.validated_count(),
            rejected_count: self.rejected_count(),
            represented_count: self.represented_count(),
            saved_count: self.saved_count(),
            save_failure_count: self.save_failure_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub validated_count: u64,
    pub rejected_count: u64,
    pub represented_count: u64,
    pub saved_count: u64,
    pub save_failure_count: u64,
}
