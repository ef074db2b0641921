//! Per-identity admission control
//!
//! Fixed-window counters keyed by (operation, identity). Counters live in
//! process memory only: in a multi-instance deployment each instance limits
//! independently. A shared-store implementation can replace
//! [`FixedWindowLimiter`] behind the [`RateLimiter`] trait without touching
//! callers.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Finished windows are dropped on every this many admits
pub const PRUNE_EVERY: u64 = 1024;

pub trait RateLimiter: Send + Sync {
    /// Admit or deny one request; never blocks
    fn admit(&self, operation: &str, identity: &str) -> bool;
}

/// Admits everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn admit(&self, _operation: &str, _identity: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Up to `max_requests` per `window` for each key
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<(String, String), Window>,
    admits: AtomicU64,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
            admits: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    /// [`RateLimiter::admit`] with an explicit clock
    ///
    /// Every [`PRUNE_EVERY`]th call also drops finished windows, before the
    /// key's own entry is locked.
    pub fn admit_at(&self, operation: &str, identity: &str, now: Instant) -> bool {
        if self.admits.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        let mut entry = self
            .windows
            .entry((operation.to_string(), identity.to_string()))
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            debug!(operation, identity, "rate limited");
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drop windows that ended before `now`
    pub fn prune(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        debug!(dropped = before.saturating_sub(self.windows.len()), "rate limit windows pruned");
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn admit(&self, operation: &str, identity: &str) -> bool {
        self.admit_at(operation, identity, Instant::now())
    }
}
