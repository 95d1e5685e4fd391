//! Domain errors

use thiserror::Error;

/// Errors surfaced by the tenancy and authorization core.
///
/// `Clone` is required so a single-flight leader can fan one failure out to
/// every caller waiting on the same host lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tenant directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant not active")]
    TenantNotActive,

    #[error("Permission load failed: {0}")]
    PermissionLoadFailed(String),

    #[error("Authorization context failed; construct a new context to retry")]
    ContextFailed,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
