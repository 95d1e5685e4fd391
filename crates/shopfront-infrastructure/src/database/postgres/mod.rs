//! PostgreSQL directory implementations

pub mod tenant_directory_impl;
pub mod permission_directory_impl;

pub use tenant_directory_impl::PgTenantDirectory;
pub use permission_directory_impl::PgPermissionDirectory;
