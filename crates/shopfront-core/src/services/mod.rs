//! Domain services (tenancy and authorization)

pub mod tenant_cache;
pub mod tenant_resolver;
pub mod permission_evaluator;
pub mod authorization_gate;

pub use tenant_cache::TenantCache;
pub use tenant_resolver::{normalize_host, Resolution, TenantResolver};
pub use permission_evaluator::{AuthorizationContext, PermissionEvaluator, PermissionState};
pub use authorization_gate::{AuthorizationGate, GateDecision, GateOptions};
