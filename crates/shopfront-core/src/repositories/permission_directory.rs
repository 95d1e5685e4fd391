//! Permission directory trait (port)

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;
use crate::error::DomainError;

/// Authoritative source of a user's effective permission codes within one
/// tenant; external collaborator, queried once per authorization context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionDirectory: Send + Sync {
    async fn load_grants(
        &self,
        user_id: &Uuid,
        tenant_id: &Uuid,
    ) -> Result<HashMap<String, bool>, DomainError>;
}
