// ============================================================================
// Shopfront API - Tenant Middleware
// File: crates/shopfront-api/src/middleware/tenant.rs
// ============================================================================
//! Resolves the inbound Host header to the acting tenant for each request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use shopfront_core::domain::Tenant;
use shopfront_core::error::DomainError;
use shopfront_core::services::Resolution;

use crate::response::ApiResponse;
use crate::state::AppState;

/// The tenant acting for the current request, placed in request extensions.
#[derive(Clone)]
pub struct ActiveTenant {
    pub tenant: Arc<Tenant>,
    /// True when the default tenant was used because no domain matched.
    pub is_fallback: bool,
}

/// Tenant resolution middleware.
///
/// Every downstream handler can rely on an [`ActiveTenant`] extension. An
/// unresolved host or an unavailable directory yields 503; the request never
/// proceeds with an arbitrary tenant.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_default();

    match state.resolver.resolve(&host).await {
        Ok(Resolution::Matched(tenant)) => {
            request
                .extensions_mut()
                .insert(ActiveTenant { tenant, is_fallback: false });
            next.run(request).await
        }
        Ok(Resolution::Default(tenant)) => {
            request
                .extensions_mut()
                .insert(ActiveTenant { tenant, is_fallback: true });
            next.run(request).await
        }
        Ok(Resolution::Unresolved) => {
            warn!(host = %host, "Request for unresolvable host rejected");
            service_unavailable("TENANT_UNRESOLVED", "No storefront is configured for this host")
        }
        Err(DomainError::DirectoryUnavailable(e)) => {
            warn!(host = %host, error = %e, "Tenant directory unavailable");
            service_unavailable("TENANT_DIRECTORY_UNAVAILABLE", "Service temporarily unavailable")
        }
        Err(e) => {
            warn!(host = %host, error = %e, "Tenant resolution failed");
            service_unavailable("TENANT_RESOLUTION_FAILED", "Service temporarily unavailable")
        }
    }
}

fn service_unavailable(code: &str, message: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(code, message)),
    )
        .into_response()
}
