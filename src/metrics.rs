// Session metrics module
//
// Lightweight counters for dispatches, persistence and navigation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session and navigation counters.
///
/// Uses atomic operations for thread-safe tracking without locks. One
/// instance is shared by the store, its persistence adapter and the
/// controller, and summarized on shutdown.
#[derive(Debug)]
pub struct SessionMetrics {
    /// Actions dispatched to the session store
    pub dispatches: AtomicU64,

    /// Actions ignored by the store (repeated initialize)
    pub ignored_dispatches: AtomicU64,

    /// Successful storage writes, removals and clears
    pub persist_writes: AtomicU64,

    /// Storage operations that failed or returned unreadable data
    pub persist_failures: AtomicU64,

    /// Change events broadcast to subscribers
    pub broadcasts: AtomicU64,

    /// Navigations resolved by the controller
    pub navigations: AtomicU64,

    /// Navigations bounced to the login page by the guard
    pub guard_redirects: AtomicU64,

    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            dispatches: AtomicU64::new(0),
            ignored_dispatches: AtomicU64::new(0),
            persist_writes: AtomicU64::new(0),
            persist_failures: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            navigations: AtomicU64::new(0),
            guard_redirects: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored_dispatch(&self) {
        self.ignored_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_write(&self) {
        self.persist_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_navigation(&self) {
        self.navigations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_guard_redirect(&self) {
        self.guard_redirects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of storage operations that failed, in `0.0..=1.0`.
    pub fn persist_failure_rate(&self) -> f64 {
        let failures = self.persist_failures.load(Ordering::Relaxed);
        let total = failures + self.persist_writes.load(Ordering::Relaxed);
        if total > 0 {
            failures as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Dispatches: {} ({} ignored), broadcasts: {}",
            self.dispatches.load(Ordering::Relaxed),
            self.ignored_dispatches.load(Ordering::Relaxed),
            self.broadcasts.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Storage: {} writes, {} failures ({:.1}% failed)",
            self.persist_writes.load(Ordering::Relaxed),
            self.persist_failures.load(Ordering::Relaxed),
            self.persist_failure_rate() * 100.0
        );
        tracing::info!(
            "Navigation: {} resolved, {} guard redirects",
            self.navigations.load(Ordering::Relaxed),
            self.guard_redirects.load(Ordering::Relaxed)
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.dispatches.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.persist_failures.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_counters() {
        let metrics = SessionMetrics::new();

        metrics.record_dispatch();
        metrics.record_dispatch();
        metrics.record_ignored_dispatch();
        metrics.record_broadcast();
        metrics.record_navigation();
        metrics.record_guard_redirect();

        assert_eq!(metrics.dispatches.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.ignored_dispatches.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.broadcasts.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.navigations.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.guard_redirects.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_persist_failure_rate() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.persist_failure_rate(), 0.0);

        metrics.record_persist_write();
        metrics.record_persist_write();
        metrics.record_persist_write();
        metrics.record_persist_failure();

        assert_eq!(metrics.persist_failure_rate(), 0.25);
    }

    #[test]
    fn test_uptime() {
        let metrics = SessionMetrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
