// ============================================================================
// Shopfront Infrastructure - PostgreSQL Tenant Directory
// File: crates/shopfront-infrastructure/src/database/postgres/tenant_directory_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use shopfront_core::domain::Tenant;
use shopfront_core::error::DomainError;
use shopfront_core::repositories::TenantDirectory;

pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub domain: String,
    pub is_default: bool,
    pub is_active: bool,
    pub theme_color: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            slug: row.slug,
            name: row.name,
            domain: row.domain,
            is_default: row.is_default,
            is_active: row.is_active,
            theme_color: row.theme_color,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn find_active_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT
                id, slug, name, domain,
                is_default, is_active, theme_color,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM tenants
            WHERE LOWER(domain) = LOWER($1)
              AND is_active = TRUE
              AND removed_at IS NULL
            "#,
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding tenant by domain: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_default(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            r#"
            SELECT
                id, slug, name, domain,
                is_default, is_active, theme_color,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM tenants
            WHERE is_default = TRUE
              AND is_active = TRUE
              AND removed_at IS NULL
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding default tenant: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            r#"
            SELECT
                id, slug, name, domain,
                is_default, is_active, theme_color,
                created_at, created_by, modified_at, modified_by,
                removed_at, removed_by
            FROM tenants
            WHERE is_active = TRUE AND removed_at IS NULL
            ORDER BY slug
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing active tenants: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
