// ============================================================================
// Shopfront API - Tenant Handlers
// File: crates/shopfront-api/src/handlers/tenant.rs
// ============================================================================
//! Read-only tenant introspection for operational verification.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use shopfront_core::domain::Tenant;
use shopfront_core::error::DomainError;
use shopfront_core::services::Resolution;

use crate::middleware::ActiveTenant;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DebugTenantQuery {
    pub host: String,
}

/// Public tenant fields exposed by the debug endpoint.
#[derive(Debug, Serialize)]
pub struct TenantDto {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub domain: String,
    pub is_default: bool,
    pub is_active: bool,
    pub theme_color: String,
}

impl From<&Tenant> for TenantDto {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id.to_string(),
            slug: tenant.slug.clone(),
            name: tenant.name.clone(),
            domain: tenant.domain.clone(),
            is_default: tenant.is_default,
            is_active: tenant.is_active,
            theme_color: tenant.theme_color.clone(),
        }
    }
}

/// GET /api/v1/storefront/current
///
/// The tenant acting for this request, as resolved by the middleware.
pub async fn current_tenant(
    Extension(active): Extension<ActiveTenant>,
) -> Json<ApiResponse<TenantDto>> {
    Json(ApiResponse::success(TenantDto::from(active.tenant.as_ref())))
}

#[derive(Debug, Serialize)]
pub struct DebugTenantResponse {
    /// Resolved tenant, or null when the host is unresolvable.
    pub tenant: Option<TenantDto>,
    pub is_fallback: bool,
    pub config_present: bool,
}

/// GET /api/v1/debug/tenant?host=...
///
/// Resolves a host exactly like request middleware would and reports the
/// outcome; no decision logic of its own.
pub async fn debug_tenant(
    State(state): State<AppState>,
    Query(query): Query<DebugTenantQuery>,
) -> Result<Json<ApiResponse<DebugTenantResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let config_present = !state.config.database.url.is_empty();

    match state.resolver.resolve(&query.host).await {
        Ok(resolution) => {
            let (tenant, is_fallback) = match &resolution {
                Resolution::Matched(t) => (Some(TenantDto::from(t.as_ref())), false),
                Resolution::Default(t) => (Some(TenantDto::from(t.as_ref())), true),
                Resolution::Unresolved => (None, false),
            };
            Ok(Json(ApiResponse::success(DebugTenantResponse {
                tenant,
                is_fallback,
                config_present,
            })))
        }
        Err(DomainError::DirectoryUnavailable(e)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error("TENANT_DIRECTORY_UNAVAILABLE", &e)),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("TENANT_RESOLUTION_FAILED", &e.to_string())),
        )),
    }
}
