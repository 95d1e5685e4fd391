// ============================================================================
// Shopfront Infrastructure - PostgreSQL Permission Directory
// File: crates/shopfront-infrastructure/src/database/postgres/permission_directory_impl.rs
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use shopfront_core::error::DomainError;
use shopfront_core::repositories::PermissionDirectory;

pub struct PgPermissionDirectory {
    pool: PgPool,
}

impl PgPermissionDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    pub code: String,
    pub granted: bool,
}

#[async_trait]
impl PermissionDirectory for PgPermissionDirectory {
    async fn load_grants(
        &self,
        user_id: &Uuid,
        tenant_id: &Uuid,
    ) -> Result<HashMap<String, bool>, DomainError> {
        let rows: Vec<GrantRow> = sqlx::query_as(
            r#"
            SELECT code, granted
            FROM user_permissions
            WHERE user_id = $1
              AND tenant_id = $2
              AND removed_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error loading permission grants: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|r| (r.code, r.granted)).collect())
    }
}
