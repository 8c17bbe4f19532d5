//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string (usually client IP).

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Successful requests are handed back with [`LocalRateLimitStore::release`]
    pub skip_successful_requests: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
            skip_successful_requests: false,
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            skip_successful_requests: false,
        }
    }

    pub fn skip_successful(mut self) -> Self {
        self.skip_successful_requests = true;
        self
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Start of the window this request was counted in
    pub window_start_ms: i64,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, rounded up
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let delta = (self.reset_at_ms - now_ms).max(0) as u64;
        delta.div_ceil(1000)
    }
}

#[derive(Debug, Error)]
pub enum RateLimitStoreError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError>;

    /// Give back one request counted in the window starting at `window_start_ms`
    ///
    /// No-op once that window has been replaced.
    async fn release(&self, key: &str, window_start_ms: i64) -> Result<(), RateLimitStoreError>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start_ms: i64,
}

/// Process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request for `key` at `now_ms`
    pub fn hit_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start_ms: now_ms,
        });

        // Reset window if expired
        if now_ms - entry.window_start_ms >= config.window_ms() {
            entry.count = 0;
            entry.window_start_ms = now_ms;
        }

        entry.count = entry.count.saturating_add(1);

        RateLimitResult {
            allowed: entry.count <= config.max_requests,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(entry.count),
            window_start_ms: entry.window_start_ms,
            reset_at_ms: entry.window_start_ms + config.window_ms(),
        }
    }

    /// Undo one hit if its window is still the current one
    pub fn release_in(&self, key: &str, window_start_ms: i64) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            if entry.window_start_ms == window_start_ms {
                entry.count = entry.count.saturating_sub(1);
            }
        }
    }

    /// Drop entries whose window ended before `now_ms`
    pub fn purge_expired_at(&self, window: Duration, now_ms: i64) -> usize {
        let window_ms = window.as_millis() as i64;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now_ms - entry.window_start_ms < window_ms);
        before - entries.len()
    }

    pub fn purge_expired(&self, window: Duration) -> usize {
        self.purge_expired_at(window, now_ms())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        Ok(self.hit_at(key, config, now_ms()))
    }

    async fn release(&self, key: &str, window_start_ms: i64) -> Result<(), RateLimitStoreError> {
        self.release_in(key, window_start_ms);
        Ok(())
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max: u32) -> RateLimitConfig {
        RateLimitConfig::new(max, 60)
    }

    #[test]
    fn test_allows_under_limit() {
        let store = MemoryRateLimitStore::new();
        let config = config(5);

        for i in 0..5 {
            let result = store.hit_at("127.0.0.1", &config, 1_000);
            assert!(result.allowed);
            assert_eq!(result.remaining, 4 - i);
        }
    }

    #[test]
    fn test_rejects_over_limit() {
        let store = MemoryRateLimitStore::new();
        let config = config(2);

        assert!(store.hit_at("ip", &config, 0).allowed);
        assert!(store.hit_at("ip", &config, 10).allowed);

        let third = store.hit_at("ip", &config, 20);
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert_eq!(third.reset_at_ms, 60_000);
        assert_eq!(third.retry_after_secs(20), 60);
    }

    #[test]
    fn test_window_resets() {
        let store = MemoryRateLimitStore::new();
        let config = config(1);

        assert!(store.hit_at("ip", &config, 0).allowed);
        assert!(!store.hit_at("ip", &config, 59_999).allowed);
        assert!(store.hit_at("ip", &config, 60_000).allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryRateLimitStore::new();
        let config = config(1);

        assert!(store.hit_at("a", &config, 0).allowed);
        assert!(store.hit_at("b", &config, 0).allowed);
        assert!(!store.hit_at("a", &config, 1).allowed);
    }

    #[test]
    fn test_release_returns_budget() {
        let store = MemoryRateLimitStore::new();
        let config = config(1).skip_successful();

        for t in 0..10 {
            let hit = store.hit_at("ip", &config, t);
            assert!(hit.allowed);
            store.release_in("ip", hit.window_start_ms);
        }
    }

    #[test]
    fn test_release_after_rollover_keeps_new_window() {
        let store = MemoryRateLimitStore::new();
        let config = config(1);

        let old = store.hit_at("ip", &config, 59_999);
        assert_eq!(old.window_start_ms, 59_999);

        // Window rolls over before the first request is released
        let rolled = store.hit_at("ip", &config, 120_000);
        assert!(rolled.allowed);
        store.release_in("ip", old.window_start_ms);

        assert!(!store.hit_at("ip", &config, 120_001).allowed);
    }

    #[test]
    fn test_purge_expired() {
        let store = MemoryRateLimitStore::new();
        let config = config(5);

        store.hit_at("old", &config, 0);
        store.hit_at("new", &config, 50_000);

        assert_eq!(store.purge_expired_at(config.window, 70_000), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_trait() {
        let store = MemoryRateLimitStore::new();
        let config = config(1);

        let first = RateLimitStore::check_and_increment(&store, "ip", &config).await.unwrap();
        assert!(first.allowed);
        let second = RateLimitStore::check_and_increment(&store, "ip", &config).await.unwrap();
        assert!(!second.allowed);

        RateLimitStore::release(&store, "ip", second.window_start_ms).await.unwrap();
        RateLimitStore::release(&store, "ip", first.window_start_ms).await.unwrap();
        assert!(RateLimitStore::check_and_increment(&store, "ip", &config).await.unwrap().allowed);
    }
}
