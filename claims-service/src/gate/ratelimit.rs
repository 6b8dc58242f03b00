//! Fixed-window rate limiting over an in-memory entry map.
//!
//! One entry per admitted request, keyed `"{client}:{timestamp_ms}"`. Expired
//! entries are purged lazily on the request path with a full scan; there is no
//! background eviction. The ceiling is enforced per process instance only —
//! multi-instance deployments get an independent window per instance.

use dashmap::DashMap;

pub const DEFAULT_WINDOW_MS: i64 = 60_000;
pub const DEFAULT_MAX_REQUESTS: usize = 300;

/// Requests without any derivable client identity share this bucket. Coarse
/// on purpose: address-less traffic is counted globally rather than skipped.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

pub struct FixedWindowLimiter {
    entries: DashMap<String, i64>,
    window_ms: i64,
    max_requests: usize,
}

impl FixedWindowLimiter {
    pub fn new(window_ms: i64, max_requests: usize) -> Self {
        Self {
            entries: DashMap::new(),
            window_ms,
            max_requests,
        }
    }

    /// Decide whether to admit a request from `client` at `now_ms`, recording
    /// it when admitted. Pure function of the window state, the client, and
    /// the supplied timestamp.
    pub fn check_and_record(&self, client: &str, now_ms: i64) -> bool {
        let window_start = now_ms - self.window_ms;

        self.entries.retain(|_, ts| *ts >= window_start);

        let prefix = format!("{client}:");
        let count = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix) && *entry.value() > window_start)
            .count();

        if count >= self.max_requests {
            return false;
        }

        self.entries.insert(format!("{client}:{now_ms}"), now_ms);
        true
    }

    #[cfg(test)]
    pub fn live_entries(&self) -> usize {
        self.entries.len()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_MAX_REQUESTS)
    }
}
