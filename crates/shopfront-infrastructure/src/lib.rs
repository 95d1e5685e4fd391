//! # Shopfront Infrastructure
//!
//! Database implementations (adapters) of the directory ports.

pub mod database;

pub use database::{create_pool, PgPermissionDirectory, PgTenantDirectory};
