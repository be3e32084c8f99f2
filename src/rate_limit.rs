//!
//! # Failed-Login Rate Limiting
//!
//! An in-memory sliding-window limiter keyed by caller identity (peer IP).
//! Only *failed* login attempts are recorded; a successful login never
//! consumes quota. The login handler calls [`RateLimiter::check`] before
//! touching the credential store and [`RateLimiter::record`] after any failed
//! outcome.
//!
//! State is process-local and independent of the credential store, which is
//! all the deployment shape here requires.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Counted attempts allowed per window before login is refused outright.
pub const LOGIN_ATTEMPT_LIMIT: usize = 5;
/// Width of the sliding window over failed attempts.
pub const LOGIN_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Sliding-window counter over failed attempts, per key.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    buckets: Mutex<HashMap<String, Vec<Instant>>>,
    sweep_threshold: usize,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            buckets: Mutex::new(HashMap::new()),
            sweep_threshold: 1024,
        }
    }

    /// The limiter guarding the login endpoint: 5 failed attempts per 10 minutes.
    pub fn for_login() -> Self {
        Self::new(LOGIN_ATTEMPT_LIMIT, LOGIN_WINDOW)
    }

    /// Checks whether `key` is over its limit without counting anything.
    ///
    /// Returns `None` when the caller may proceed, or `Some(retry_after)` with
    /// the number of seconds until the oldest counted attempt leaves the
    /// window.
    pub async fn check(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        let buckets = self.buckets.lock().await;
        let entry = buckets.get(key)?;

        let recent: Vec<&Instant> = entry
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .collect();
        if recent.len() < self.limit {
            return None;
        }

        let oldest = recent
            .iter()
            .map(|t| now.duration_since(**t))
            .max()
            .unwrap_or(Duration::ZERO);
        let retry_after = self.window.saturating_sub(oldest).as_secs().max(1);
        Some(retry_after)
    }

    /// Records one failed attempt for `key`.
    pub async fn record(&self, key: &str) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let entry = buckets.entry(key.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < self.window);
        entry.push(now);

        // Full sweep once the map grows past the threshold, so abandoned keys
        // cannot accumulate without bound.
        if buckets.len() > self.sweep_threshold {
            buckets.retain(|_, times| {
                times.retain(|t| now.duration_since(*t) < self.window);
                !times.is_empty()
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_blocks_after_limit_within_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(600));

        for _ in 0..5 {
            assert!(limiter.check("10.0.0.1").await.is_none());
            limiter.record("10.0.0.1").await;
        }

        // The sixth attempt inside the window is refused before any
        // credential check would run.
        let retry_after = limiter.check("10.0.0.1").await;
        assert!(retry_after.is_some());
        assert!(retry_after.unwrap() <= 600);
    }

    #[actix_rt::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(2, Duration::from_secs(600));
        limiter.record("10.0.0.1").await;
        limiter.record("10.0.0.1").await;

        assert!(limiter.check("10.0.0.1").await.is_some());
        assert!(limiter.check("10.0.0.2").await.is_none());
    }

    #[actix_rt::test]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        limiter.record("10.0.0.1").await;
        assert!(limiter.check("10.0.0.1").await.is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("10.0.0.1").await.is_none());
    }

    #[actix_rt::test]
    async fn test_check_does_not_consume_quota() {
        let limiter = RateLimiter::new(1, Duration::from_secs(600));
        for _ in 0..10 {
            assert!(limiter.check("10.0.0.9").await.is_none());
        }
        limiter.record("10.0.0.9").await;
        assert!(limiter.check("10.0.0.9").await.is_some());
    }
}
