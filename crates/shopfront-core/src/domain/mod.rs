//! # Shopfront Core - Domain Module
//!
//! Domain entities for tenancy and authorization.

pub mod tenant;
pub mod permission;

// Re-export all entities
pub use tenant::Tenant;
pub use permission::PermissionSet;
