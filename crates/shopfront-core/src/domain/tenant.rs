// ============================================================================
// Shopfront Core - Tenant Entity
// File: crates/shopfront-core/src/domain/tenant.rs
// Description: Brand/tenant record with domain mapping and default flag
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tenant (brand) entity.
///
/// One tenant per storefront brand; `domain` is the canonical host this
/// tenant is served under and is stored normalized (lowercase, no port, no
/// `www.` label). At most one active tenant should carry `is_default`; the
/// resolver falls back to it when no domain matches.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Slug must be between 2 and 100 characters"))]
    pub slug: String,

    #[validate(length(min = 2, max = 100, message = "Tenant name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 253, message = "Domain must be between 1 and 253 characters"))]
    pub domain: String,

    pub is_default: bool,
    pub is_active: bool,

    /// Presentation attribute, opaque to resolution logic.
    pub theme_color: String,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl Tenant {
    pub fn new(
        slug: String,
        name: String,
        domain: String,
        is_default: bool,
        theme_color: String,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let tenant = Self {
            id: Uuid::new_v4(),
            slug: slug.trim().to_lowercase(),
            name: name.trim().to_string(),
            domain: domain.trim().to_lowercase(),
            is_default,
            is_active: true,
            theme_color,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    /// Whether this tenant may act as the resolved tenant for a request.
    pub fn is_resolvable(&self) -> bool {
        self.is_active && !self.is_deleted()
    }

    pub fn deactivate(&mut self, modified_by: Uuid) {
        self.is_active = false;
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.removed_at = Some(Utc::now());
        self.removed_by = Some(deleted_by);
        self.is_active = false;
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}
