use std::sync::Arc;

use sqlx::PgPool;

use shopfront_core::services::TenantResolver;
use shopfront_infrastructure::PgTenantDirectory;
use shopfront_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
    pub resolver: Arc<TenantResolver<PgTenantDirectory>>,
}
