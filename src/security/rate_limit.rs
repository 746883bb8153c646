//! Per-client rate limiting with a fixed-window counter.
//!
//! Transport-agnostic core. The HTTP layer extracts a [`ClientKey`] and the
//! gateway calls [`RateLimitStore::check`] for API-classified paths only.
//!
//! The store is a trait so a multi-instance deployment can inject a shared
//! backend; the default [`FixedWindowStore`] is in-memory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;

/// Sentinel key used when no client address information is available.
///
/// All unidentifiable clients share one bucket. That degrades precision
/// rather than disabling the limiter.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Identifier used to bucket rate-limit state.
///
/// Derived from proxy headers or the peer address. Not unique per physical
/// client: proxies, shared NAT, or the fallback sentinel can alias multiple
/// clients onto one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The shared fallback key.
    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a rate-limit check. This component cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Blocked,
}

/// Pluggable store for rate-limit state.
///
/// Implementations must guarantee that concurrent checks on the same key are
/// not lost; the limiter undercounts otherwise.
pub trait RateLimitStore: Send + Sync {
    /// Check and record one request for `key`.
    fn check(&self, key: &ClientKey) -> RateDecision;

    /// Drop entries whose window has expired.
    fn sweep(&self);

    /// Number of keys currently tracked.
    fn tracked_keys(&self) -> usize;
}

/// Per-key counter state for one fixed window.
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// In-memory fixed-window rate limiter.
///
/// Not a sliding window: a burst straddling a window boundary can pass up to
/// twice the configured limit. That leniency is part of the contract.
pub struct FixedWindowStore {
    max_requests: u32,
    window: Duration,
    windows: DashMap<ClientKey, RateWindow>,
}

impl FixedWindowStore {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }
}

impl RateLimitStore for FixedWindowStore {
    fn check(&self, key: &ClientKey) -> RateDecision {
        // The entry guard serializes concurrent checks on one key.
        let mut entry = self.windows.entry(key.clone()).or_insert_with(|| RateWindow {
            count: 0,
            window_start: Instant::now(),
        });

        if entry.window_start.elapsed() > self.window {
            entry.count = 1;
            entry.window_start = Instant::now();
            RateDecision::Allowed
        } else if entry.count >= self.max_requests {
            // Record left unchanged while blocked.
            RateDecision::Blocked
        } else {
            entry.count += 1;
            RateDecision::Allowed
        }
    }

    fn sweep(&self) {
        let window = self.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| w.window_start.elapsed() <= window);
        let removed = before - self.windows.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.windows.len(), "Swept expired rate windows");
        }
    }

    fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// Background task that periodically evicts expired windows.
///
/// Bounds memory under high-cardinality or spoofed client keys; live windows
/// are never touched, so limiter behavior is unaffected.
pub async fn sweep_task(store: Arc<dyn RateLimitStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        store.sweep();
        crate::observability::metrics::record_tracked_keys(&store);
    }
}
