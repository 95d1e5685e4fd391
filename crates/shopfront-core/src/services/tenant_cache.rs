// ============================================================================
// Shopfront Core - Tenant Cache
// File: crates/shopfront-core/src/services/tenant_cache.rs
// ============================================================================
//! Process-wide memoization of resolved tenants keyed by normalized host.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::Tenant;
use crate::error::DomainError;

type FlightResult = Result<Option<Arc<Tenant>>, DomainError>;
type FlightSlot = Arc<Mutex<Option<FlightResult>>>;

struct CacheEntry {
    tenant: Arc<Tenant>,
    inserted_at: Instant,
    last_used: Instant,
}

/// Thread-safe in-memory tenant cache.
///
/// Uses DashMap for lock-free concurrent access. Expiry is lazy: entries past
/// the TTL are treated as absent and removed on the next read, no background
/// sweep. The tenant set is small and administratively bounded, so the
/// capacity limit is defensive only; beyond it the least-recently-used entry
/// is evicted.
///
/// Constructed explicitly at process start and shared by cloning; there is no
/// implicit process-global instance.
#[derive(Clone)]
pub struct TenantCache {
    storage: Arc<DashMap<String, CacheEntry>>,

    /// One in-flight directory lookup per normalized host (single-flight).
    flights: Arc<DashMap<String, FlightSlot>>,

    ttl: Duration,
    capacity: usize,
}

impl TenantCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        info!(ttl_secs = ttl.as_secs(), capacity, "Initializing tenant cache");
        Self {
            storage: Arc::new(DashMap::new()),
            flights: Arc::new(DashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Get a cached tenant by normalized host.
    ///
    /// Returns None if absent or expired. Never suspends.
    pub fn get(&self, host: &str) -> Option<Arc<Tenant>> {
        let mut entry = self.storage.get_mut(host)?;

        // Lazy expiry
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.storage.remove(host);
            debug!(host, "Cached tenant expired, removed");
            return None;
        }

        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.tenant))
    }

    /// Insert or overwrite the tenant resolved for a normalized host.
    pub fn set(&self, host: &str, tenant: Arc<Tenant>) {
        let now = Instant::now();
        self.storage.insert(
            host.to_string(),
            CacheEntry { tenant, inserted_at: now, last_used: now },
        );
        debug!(host, "Cached resolved tenant");
        self.enforce_capacity();
    }

    /// Drop one host's entry, e.g. after an administrative domain change.
    pub fn invalidate(&self, host: &str) {
        if self.storage.remove(host).is_some() {
            info!(host, "Invalidated cached tenant");
        }
    }

    /// Drop every entry, e.g. on configuration reload.
    pub fn invalidate_all(&self) {
        let count = self.storage.len();
        self.storage.clear();
        info!(count, "Invalidated all cached tenants");
    }

    /// Memoizing wrapper with single-flight deduplication.
    ///
    /// For any given host at most one `load` runs at a time; concurrent
    /// callers for the same host await the leader and receive the same value
    /// or the same failure. `Ok(Some(_))` results are cached; `Ok(None)`
    /// (no tenant resolvable) is not, so a later call retries the directory.
    pub async fn get_or_load<F, Fut>(&self, host: &str, load: F) -> FlightResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FlightResult>,
    {
        if let Some(tenant) = self.get(host) {
            return Ok(Some(tenant));
        }

        // Claim flight leadership for this host. The leader locks its slot
        // before publishing it, so followers block until a result is stored.
        let (slot, leader_guard) = match self.flights.entry(host.to_string()) {
            Entry::Occupied(existing) => (existing.get().clone(), None),
            Entry::Vacant(vacant) => {
                let slot: FlightSlot = Arc::new(Mutex::new(None));
                let guard = slot.clone().try_lock_owned().ok();
                vacant.insert(Arc::clone(&slot));
                (slot, guard)
            }
        };

        if let Some(mut guard) = leader_guard {
            // A previous flight may have filled the cache between our miss
            // and claiming leadership.
            if let Some(tenant) = self.get(host) {
                self.flights.remove(host);
                return Ok(Some(tenant));
            }

            let result = load().await;
            if let Ok(Some(tenant)) = &result {
                self.set(host, Arc::clone(tenant));
            }
            *guard = Some(result.clone());
            self.flights.remove(host);
            return result;
        }

        // Follower: wait for the leader's shared outcome.
        let guard = slot.lock().await;
        match guard.as_ref() {
            Some(result) => result.clone(),
            // Leader finished without storing (it served a fresh cache hit);
            // re-read the cache.
            None => Ok(self.get(host)),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Remove expired entries eagerly (manual trigger).
    /// Returns number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let start_len = self.storage.len();
        let ttl = self.ttl;
        self.storage.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
        let count = start_len.saturating_sub(self.storage.len());
        if count > 0 {
            info!(count, "Cleaned up expired tenant cache entries");
        }
        count
    }

    fn enforce_capacity(&self) {
        while self.storage.len() > self.capacity {
            let oldest = self
                .storage
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.storage.remove(&key);
                    warn!(host = %key, "Tenant cache over capacity, evicted LRU entry");
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tenant(slug: &str, domain: &str) -> Arc<Tenant> {
        Arc::new(
            Tenant::new(
                slug.to_string(),
                slug.to_uppercase(),
                domain.to_string(),
                false,
                "#112233".to_string(),
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_get_returns_within_ttl() {
        let cache = TenantCache::new(Duration::from_secs(60), 16);
        cache.set("acme.com", tenant("acme", "acme.com"));
        assert_eq!(cache.get("acme.com").unwrap().slug, "acme");
    }

    #[test]
    fn test_expired_entry_treated_as_absent() {
        let cache = TenantCache::new(Duration::ZERO, 16);
        cache.set("acme.com", tenant("acme", "acme.com"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("acme.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let cache = TenantCache::new(Duration::from_secs(60), 16);
        cache.set("acme.com", tenant("acme", "acme.com"));
        cache.set("globex.com", tenant("globex", "globex.com"));
        cache.invalidate("acme.com");
        assert!(cache.get("acme.com").is_none());
        assert!(cache.get("globex.com").is_some());
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_expired_removes_stale_entries() {
        let cache = TenantCache::new(Duration::from_millis(10), 16);
        cache.set("a.com", tenant("aa", "a.com"));
        cache.set("b.com", tenant("bb", "b.com"));
        std::thread::sleep(Duration::from_millis(20));
        cache.set("c.com", tenant("cc", "c.com"));

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c.com").is_some());
    }

    #[test]
    fn test_lru_eviction_beyond_capacity() {
        let cache = TenantCache::new(Duration::from_secs(60), 2);
        cache.set("a.com", tenant("aa", "a.com"));
        std::thread::sleep(Duration::from_millis(5));
        cache.set("b.com", tenant("bb", "b.com"));
        std::thread::sleep(Duration::from_millis(5));
        // Touch a.com so b.com becomes least recently used.
        assert!(cache.get("a.com").is_some());
        cache.set("c.com", tenant("cc", "c.com"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b.com").is_none());
        assert!(cache.get("a.com").is_some());
        assert!(cache.get("c.com").is_some());
    }

    #[tokio::test]
    async fn test_single_flight_dedupes_concurrent_loads() {
        let cache = TenantCache::new(Duration::from_secs(60), 16);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("acme.com", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(Some(tenant("acme", "acme.com")))
                    })
                    .await
            }));
        }

        for handle in handles {
            let resolved = handle.await.unwrap().unwrap().unwrap();
            assert_eq!(resolved.slug, "acme");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_flight_shares_failure() {
        let cache = TenantCache::new(Duration::from_secs(60), 16);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("down.com", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err(DomainError::DirectoryUnavailable("connection refused".into()))
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(DomainError::DirectoryUnavailable(_))));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Failures are not cached.
        assert!(cache.get("down.com").is_none());
    }

    #[tokio::test]
    async fn test_unresolved_outcome_not_cached() {
        let cache = TenantCache::new(Duration::from_secs(60), 16);
        let result = cache.get_or_load("nobody.com", || async { Ok(None) }).await;
        assert!(result.unwrap().is_none());
        assert!(cache.get("nobody.com").is_none());
    }
}
