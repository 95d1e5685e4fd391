//! Request middleware

pub mod tenant;

pub use tenant::{resolve_tenant, ActiveTenant};
