//! Tenant directory trait (port)

use async_trait::async_trait;
use crate::domain::Tenant;
use crate::error::DomainError;

/// Authoritative store of tenant records; read-only from this core.
///
/// Queries take normalized domains (lowercase, no port, no `www.`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Exact-domain lookup among active, non-deleted tenants.
    async fn find_active_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError>;

    /// All active tenants flagged as default.
    ///
    /// Well-configured directories hold at most one; returning the full list
    /// lets the resolver log the inconsistency instead of masking it.
    async fn find_default(&self) -> Result<Vec<Tenant>, DomainError>;

    /// All active tenants, for administrative/debug surfaces.
    async fn list_active(&self) -> Result<Vec<Tenant>, DomainError>;
}
