//! # Shopfront API
//!
//! HTTP handlers, tenant middleware, and response envelope.

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod state;
