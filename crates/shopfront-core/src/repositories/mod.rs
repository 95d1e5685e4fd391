//! Repository traits (ports)

pub mod tenant_directory;
pub mod permission_directory;

pub use tenant_directory::TenantDirectory;
pub use permission_directory::PermissionDirectory;
