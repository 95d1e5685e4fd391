use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use shopfront_api::{handlers::{health, tenant}, middleware::resolve_tenant, state::AppState};
use shopfront_core::services::{TenantCache, TenantResolver};
use shopfront_infrastructure::{database::connection, PgTenantDirectory};
use shopfront_shared::config::AppConfig;
use shopfront_shared::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    shopfront_shared::telemetry::init_telemetry();

    info!("Shopfront server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(AppError::from(e).into());
        }
    };

    // Connect to Database
    info!("Connecting to database...");
    let pool = connection::create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database connection established.");

    // Tenant resolution stack: directory adapter, process-wide cache, resolver
    let directory = Arc::new(PgTenantDirectory::new(pool.clone()));
    let cache = TenantCache::new(
        Duration::from_secs(config.tenancy.cache_ttl_secs),
        config.tenancy.cache_capacity,
    );
    let resolver = Arc::new(TenantResolver::new(
        directory,
        cache,
        Duration::from_millis(config.tenancy.lookup_timeout_ms),
    ));

    // Create App State
    let state = AppState {
        db: pool,
        config: config.clone(),
        resolver,
    };

    // Build router; storefront routes sit behind tenant resolution, the
    // health and debug endpoints do not.
    let storefront = Router::new()
        .route("/api/v1/storefront/current", get(tenant::current_tenant))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_tenant));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/debug/tenant", get(tenant::debug_tenant))
        .merge(storefront)
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
