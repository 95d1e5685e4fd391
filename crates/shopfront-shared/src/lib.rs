//! # Shopfront Shared
//!
//! Shared configuration, telemetry, and error types for the Shopfront
//! multi-tenant storefront.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use error::AppError;
