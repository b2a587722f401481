//! Run-scoped fetch counters.
//!
//! Counters are the only externally observable state of a run besides the
//! emitted record set. They are written from concurrent fetch tasks, so
//! they are plain atomics; reads may be taken at any time and are
//! finalized when the run ends.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one harvest run.
#[derive(Debug, Default)]
pub struct RunStats {
    requests: AtomicU64,
    successes: AtomicU64,
    rate_limited: AtomicU64,
    retries: AtomicU64,
    records: AtomicU64,
    unrecognized_payloads: AtomicU64,
}

impl RunStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one issued request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one successful (HTTP 200) response.
    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one rate-limited (HTTP 429) response.
    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed attempt that will be (or would have been) retried.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Count records extracted from a successful response.
    pub fn record_records(&self, count: usize) {
        self.records.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Count a 200-response whose body had no recognizable payload shape.
    ///
    /// Kept separate from ordinary empty results so a source changing its
    /// payload format is distinguishable from sparse coverage.
    pub fn record_unrecognized(&self) {
        self.unrecognized_payloads.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            unrecognized_payloads: self.unrecognized_payloads.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests issued, across all attempts
    pub requests: u64,
    /// HTTP 200 responses
    pub successes: u64,
    /// HTTP 429 responses
    pub rate_limited: u64,
    /// Failed attempts
    pub retries: u64,
    /// Records extracted before cross-sector dedup
    pub records: u64,
    /// Successful responses with no recognizable payload shape
    pub unrecognized_payloads: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} successes={} rate_limited={} retries={} records={} unrecognized={}",
            self.requests,
            self.successes,
            self.rate_limited,
            self.retries,
            self.records,
            self.unrecognized_payloads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = RunStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success();
        stats.record_rate_limited();
        stats.record_retry();
        stats.record_records(7);
        stats.record_unrecognized();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.successes, 1);
        assert_eq!(snapshot.rate_limited, 1);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.records, 7);
        assert_eq!(snapshot.unrecognized_payloads, 1);
    }

    #[test]
    fn test_snapshot_is_readable_mid_run() {
        let stats = RunStats::new();
        stats.record_request();
        let first = stats.snapshot();
        stats.record_request();
        let second = stats.snapshot();

        assert_eq!(first.requests, 1);
        assert_eq!(second.requests, 2);
    }

    #[test]
    fn test_display_format() {
        let stats = RunStats::new();
        stats.record_request();
        let rendered = stats.snapshot().to_string();
        assert!(rendered.contains("requests=1"));
        assert!(rendered.contains("unrecognized=0"));
    }
}
