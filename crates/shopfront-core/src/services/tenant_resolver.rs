// ============================================================================
// Shopfront Core - Tenant Resolver
// File: crates/shopfront-core/src/services/tenant_resolver.rs
// ============================================================================
//! Maps an inbound host identifier to the acting tenant.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::Tenant;
use crate::error::DomainError;
use crate::repositories::TenantDirectory;
use crate::services::tenant_cache::TenantCache;

/// Outcome of resolving a host to a tenant.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The host matched a tenant's domain exactly.
    Matched(Arc<Tenant>),
    /// No domain matched; the active default tenant was used.
    Default(Arc<Tenant>),
    /// No match and no active default tenant. Callers must reject or serve
    /// a generic error page, never pick an arbitrary tenant.
    Unresolved,
}

impl Resolution {
    pub fn tenant(&self) -> Option<&Arc<Tenant>> {
        match self {
            Resolution::Matched(t) | Resolution::Default(t) => Some(t),
            Resolution::Unresolved => None,
        }
    }
}

/// Normalize a raw host identifier into a cache key.
///
/// Lowercases, trims, strips one `:port` suffix and one leading `www.`
/// label. Idempotent: normalizing a normalized host is a no-op.
pub fn normalize_host(raw: &str) -> String {
    let mut host = raw.trim().to_lowercase();
    if let Some(colon) = host.rfind(':') {
        // Only strip a digit port, not a mangled value.
        if host[colon + 1..].chars().all(|c| c.is_ascii_digit()) {
            host.truncate(colon);
        }
    }
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    host
}

/// Resolves inbound hosts against the tenant directory, memoizing through
/// the shared [`TenantCache`].
///
/// Directory lookups are bounded by `lookup_timeout`; a timeout or transport
/// failure surfaces as [`DomainError::DirectoryUnavailable`], which is
/// transient and distinct from the definitive [`Resolution::Unresolved`].
pub struct TenantResolver<D: TenantDirectory> {
    directory: Arc<D>,
    cache: TenantCache,
    lookup_timeout: Duration,
}

impl<D: TenantDirectory> TenantResolver<D> {
    pub fn new(directory: Arc<D>, cache: TenantCache, lookup_timeout: Duration) -> Self {
        Self { directory, cache, lookup_timeout }
    }

    /// Resolve a raw host identifier to the acting tenant.
    ///
    /// Cache hits never suspend on the directory; the cache's single-flight
    /// guarantee collapses concurrent misses for one host into one lookup.
    pub async fn resolve(&self, raw_host: &str) -> Result<Resolution, DomainError> {
        let host = normalize_host(raw_host);
        if host.is_empty() {
            warn!("Empty host after normalization, refusing to resolve");
            return Ok(Resolution::Unresolved);
        }

        let resolved = self
            .cache
            .get_or_load(&host, || self.lookup(host.clone()))
            .await?;

        Ok(match resolved {
            Some(tenant) if tenant.domain == host => Resolution::Matched(tenant),
            Some(tenant) => Resolution::Default(tenant),
            None => Resolution::Unresolved,
        })
    }

    /// Drop a host's cached resolution, e.g. after an administrative update
    /// to a tenant's domain.
    pub fn invalidate(&self, raw_host: &str) {
        self.cache.invalidate(&normalize_host(raw_host));
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Uncached directory lookup: exact domain match first, then the active
    /// default tenant, else no tenant (fail closed).
    async fn lookup(&self, host: String) -> Result<Option<Arc<Tenant>>, DomainError> {
        debug!(host = %host, "Tenant cache miss, querying directory");

        if let Some(tenant) = self.query(self.directory.find_active_by_domain(&host)).await? {
            if tenant.is_resolvable() {
                info!(host = %host, slug = %tenant.slug, "Resolved tenant by domain");
                return Ok(Some(Arc::new(tenant)));
            }
            // The directory filters on is_active; re-check rather than trust.
            warn!(host = %host, slug = %tenant.slug, "Directory returned non-resolvable tenant, ignoring");
        }

        let mut defaults = self.query(self.directory.find_default()).await?;
        defaults.retain(Tenant::is_resolvable);

        if defaults.len() > 1 {
            // Data inconsistency, not a crash: proceed with the first.
            warn!(
                count = defaults.len(),
                "Multiple active default tenants configured; using the first"
            );
        }

        match defaults.into_iter().next() {
            Some(default) => {
                info!(host = %host, slug = %default.slug, "No domain match, using default tenant");
                Ok(Some(Arc::new(default)))
            }
            None => {
                warn!(host = %host, "No domain match and no default tenant; unresolved");
                Ok(None)
            }
        }
    }

    async fn query<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.lookup_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(DomainError::DatabaseError(e))) => Err(DomainError::DirectoryUnavailable(e)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DomainError::DirectoryUnavailable(format!(
                "directory lookup timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }
}
