//! Report snapshot caching using Moka.
//!
//! Report screens re-render often but the underlying ledger changes
//! slowly; computed snapshots are cached with a TTL and refreshed on
//! demand. The cache is an explicit object injected where it is needed,
//! never a module-global.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::stock::StockBalance;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache for computed stock reports.
///
/// Keyed by report scope (e.g. a requisition id, or "all"). Thread-safe
/// and suitable for concurrent access.
#[derive(Clone)]
pub struct ReportCache {
    cache: Cache<String, Arc<Vec<StockBalance>>>,
}

impl ReportCache {
    /// Creates a new report cache with default settings.
    ///
    /// Default: 100 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new report cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns the cached snapshot for a scope, if present and fresh.
    ///
    /// Callers that need to do I/O to rebuild the snapshot check here
    /// first so a cache hit skips the fetch entirely.
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<Arc<Vec<StockBalance>>> {
        self.cache.get(scope)
    }

    /// Returns the cached snapshot for a scope, refreshing it when absent
    /// or expired.
    ///
    /// The refresh closure runs only on a miss; its result is cached
    /// before being returned.
    pub fn get_or_refresh<F>(&self, scope: &str, refresh: F) -> Arc<Vec<StockBalance>>
    where
        F: FnOnce() -> Vec<StockBalance>,
    {
        if let Some(cached) = self.cache.get(scope) {
            return cached;
        }

        let snapshot = Arc::new(refresh());
        self.cache.insert(scope.to_string(), Arc::clone(&snapshot));
        snapshot
    }

    /// Invalidates the snapshot for one scope.
    pub fn invalidate(&self, scope: &str) {
        self.cache.invalidate(scope);
    }

    /// Invalidates all cached snapshots.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka handles expiry in the background; calling this explicitly
    /// helps reclaim memory sooner.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn snapshot() -> Vec<StockBalance> {
        Vec::new()
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = ReportCache::new();
        let calls = Cell::new(0u32);

        let refresh = || {
            calls.set(calls.get() + 1);
            snapshot()
        };
        let _ = cache.get_or_refresh("all", refresh);
        assert_eq!(calls.get(), 1);

        // Second call hits the cache; refresh does not run again.
        let refresh = || {
            calls.set(calls.get() + 1);
            snapshot()
        };
        let _ = cache.get_or_refresh("all", refresh);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_scopes_are_independent() {
        let cache = ReportCache::new();
        let calls = Cell::new(0u32);

        for scope in ["all", "req-1", "all"] {
            let refresh = || {
                calls.set(calls.get() + 1);
                snapshot()
            };
            let _ = cache.get_or_refresh(scope, refresh);
        }

        // "all" computed once, "req-1" once.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate_forces_refresh() {
        let cache = ReportCache::new();
        let calls = Cell::new(0u32);

        let refresh = || {
            calls.set(calls.get() + 1);
            snapshot()
        };
        let _ = cache.get_or_refresh("all", refresh);

        cache.invalidate("all");
        cache.run_pending_tasks();

        let refresh = || {
            calls.set(calls.get() + 1);
            snapshot()
        };
        let _ = cache.get_or_refresh("all", refresh);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = ReportCache::with_config(10, 60);
        let _ = cache.get_or_refresh("a", snapshot);
        let _ = cache.get_or_refresh("b", snapshot);
        cache.run_pending_tasks();
        assert!(cache.entry_count() >= 2);

        cache.invalidate_all();
        cache.run_pending_tasks();
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_default_impl() {
        let cache = ReportCache::default();
        let _ = cache.get_or_refresh("all", snapshot);
    }
}
