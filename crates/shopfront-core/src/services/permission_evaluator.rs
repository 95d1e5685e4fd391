// ============================================================================
// Shopfront Core - Permission Evaluator
// File: crates/shopfront-core/src/services/permission_evaluator.rs
// ============================================================================
//! Per-context permission loading and fail-closed capability queries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::PermissionSet;
use crate::error::DomainError;
use crate::repositories::PermissionDirectory;

/// Lifecycle of one authorization context.
///
/// `Ready` is re-entered only through `Loading` on an explicit refresh.
/// `Failed` is terminal for the context instance: construct a new context to
/// retry, so failures stay observable instead of being retried silently.
#[derive(Debug, Clone)]
pub enum PermissionState {
    Uninitialized,
    Loading,
    Ready(Arc<PermissionSet>),
    Failed(String),
}

/// Capability queries exposed to gates and the rest of the application.
///
/// Every query fails closed: anything other than a loaded grant evaluates to
/// not granted. `can(code) == true` always means the capability is available.
pub trait PermissionEvaluator: Send + Sync {
    fn can(&self, code: &str) -> bool;
    fn can_all(&self, codes: &[&str]) -> bool;
    fn can_any(&self, codes: &[&str]) -> bool;
    fn loading(&self) -> bool;
    fn error(&self) -> Option<String>;
}

/// One authenticated identity's authorization context within one tenant.
///
/// The permission set is loaded once per context and swapped atomically as a
/// whole; concurrent readers always see the old or the new set in full. A
/// load whose context was refreshed or torn down mid-flight completes
/// without effect.
pub struct AuthorizationContext<P: PermissionDirectory> {
    directory: Arc<P>,
    user_id: Uuid,
    tenant_id: Uuid,
    state: RwLock<PermissionState>,
    /// Bumped on every load/refresh/teardown; a finished load applies its
    /// result only if the epoch it started under is still current.
    epoch: AtomicU64,
    load_timeout: Duration,
}

impl<P: PermissionDirectory> AuthorizationContext<P> {
    pub fn new(directory: Arc<P>, user_id: Uuid, tenant_id: Uuid, load_timeout: Duration) -> Self {
        Self {
            directory,
            user_id,
            tenant_id,
            state: RwLock::new(PermissionState::Uninitialized),
            epoch: AtomicU64::new(0),
            load_timeout,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn state(&self) -> PermissionState {
        self.state.read().clone()
    }

    /// Loaded set, if the context is `Ready`.
    pub fn permission_set(&self) -> Option<Arc<PermissionSet>> {
        match &*self.state.read() {
            PermissionState::Ready(set) => Some(Arc::clone(set)),
            _ => None,
        }
    }

    /// Load the permission set from the directory.
    ///
    /// Rejected once the context has failed. On directory failure the state
    /// becomes `Failed` and the error is returned; queries stay not-granted
    /// either way.
    pub async fn load(&self) -> Result<(), DomainError> {
        let my_epoch = {
            let mut state = self.state.write();
            if let PermissionState::Failed(_) = &*state {
                return Err(DomainError::ContextFailed);
            }
            *state = PermissionState::Loading;
            self.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };
        debug!(user_id = %self.user_id, tenant_id = %self.tenant_id, "Loading permission set");

        let result = tokio::time::timeout(
            self.load_timeout,
            self.directory.load_grants(&self.user_id, &self.tenant_id),
        )
        .await;

        let outcome = match result {
            Ok(Ok(grants)) => Ok(PermissionSet::new(grants)),
            Ok(Err(e)) => Err(DomainError::PermissionLoadFailed(e.to_string())),
            Err(_) => Err(DomainError::PermissionLoadFailed(format!(
                "permission load timed out after {:?}",
                self.load_timeout
            ))),
        };

        let mut state = self.state.write();
        if self.epoch.load(Ordering::SeqCst) != my_epoch {
            // Superseded by a newer load or a teardown; discard.
            debug!(user_id = %self.user_id, "Discarding stale permission load result");
            return Ok(());
        }

        match outcome {
            Ok(set) => {
                info!(
                    user_id = %self.user_id,
                    tenant_id = %self.tenant_id,
                    codes = set.len(),
                    "Permission set loaded"
                );
                *state = PermissionState::Ready(Arc::new(set));
                Ok(())
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Permission load failed");
                *state = PermissionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Explicit reload, e.g. after a tenant switch; transitions back through
    /// `Loading`.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        self.load().await
    }

    /// Tear the context down. An in-flight load completes without effect.
    pub fn teardown(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.state.write() = PermissionState::Uninitialized;
    }
}

impl<P: PermissionDirectory> PermissionEvaluator for AuthorizationContext<P> {
    fn can(&self, code: &str) -> bool {
        match &*self.state.read() {
            PermissionState::Ready(set) => set.granted(code),
            _ => false,
        }
    }

    /// Not granted until `Ready`, even for an empty input: a context still
    /// loading answers false to everything.
    fn can_all(&self, codes: &[&str]) -> bool {
        match &*self.state.read() {
            PermissionState::Ready(set) => set.granted_all(codes.iter().copied()),
            _ => false,
        }
    }

    fn can_any(&self, codes: &[&str]) -> bool {
        match &*self.state.read() {
            PermissionState::Ready(set) => set.granted_any(codes.iter().copied()),
            _ => false,
        }
    }

    /// True until the set has completed loading (or failed); callers should
    /// defer rendering decisions while this holds.
    fn loading(&self) -> bool {
        matches!(
            &*self.state.read(),
            PermissionState::Uninitialized | PermissionState::Loading
        )
    }

    fn error(&self) -> Option<String> {
        match &*self.state.read() {
            PermissionState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::permission_directory::MockPermissionDirectory;
    use std::collections::HashMap;

    fn grants(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(c, g)| (c.to_string(), *g)).collect()
    }

    fn context(directory: MockPermissionDirectory) -> AuthorizationContext<MockPermissionDirectory> {
        AuthorizationContext::new(
            Arc::new(directory),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_loaded_context_answers_queries() {
        let mut directory = MockPermissionDirectory::new();
        directory
            .expect_load_grants()
            .times(1)
            .returning(|_, _| Ok(grants(&[("pos.safe", true), ("orders.refund", false)])));

        let ctx = context(directory);
        ctx.load().await.unwrap();

        assert!(!ctx.loading());
        assert!(ctx.can("pos.safe"));
        assert!(!ctx.can("orders.refund"));
        assert!(!ctx.can("unknown.code"));
        assert!(ctx.can_all(&[]));
        assert!(!ctx.can_any(&[]));
        assert!(ctx.can_any(&["orders.refund", "pos.safe"]));
    }

    // Pins the polarity convention end to end: a granted code means allowed.
    #[tokio::test]
    async fn test_can_true_means_allowed() {
        let mut directory = MockPermissionDirectory::new();
        directory
            .expect_load_grants()
            .returning(|_, _| Ok(grants(&[("pos.safe", true)])));

        let ctx = context(directory);
        ctx.load().await.unwrap();
        assert!(ctx.can("pos.safe"));
    }

    #[tokio::test]
    async fn test_queries_fail_closed_before_load() {
        let directory = MockPermissionDirectory::new();
        let ctx = context(directory);

        assert!(ctx.loading());
        assert!(!ctx.can("pos.safe"));
        assert!(!ctx.can_all(&[]));
        assert!(!ctx.can_any(&["pos.safe"]));
    }

    #[tokio::test]
    async fn test_queries_fail_closed_while_loading() {
        struct StalledDirectory;

        #[async_trait::async_trait]
        impl PermissionDirectory for StalledDirectory {
            async fn load_grants(
                &self,
                _user_id: &Uuid,
                _tenant_id: &Uuid,
            ) -> Result<HashMap<String, bool>, DomainError> {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(grants(&[("pos.safe", true)]))
            }
        }

        let ctx = Arc::new(AuthorizationContext::new(
            Arc::new(StalledDirectory),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Duration::from_secs(1),
        ));

        let loader = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.load().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Mid-load: conservative answers even though the eventual set grants.
        assert!(ctx.loading());
        assert!(!ctx.can("pos.safe"));
        assert!(!ctx.can_any(&["pos.safe"]));

        loader.await.unwrap().unwrap();
        assert!(ctx.can("pos.safe"));
    }

    #[tokio::test]
    async fn test_failed_context_is_terminal() {
        let mut directory = MockPermissionDirectory::new();
        directory
            .expect_load_grants()
            .returning(|_, _| Err(DomainError::DatabaseError("connection refused".into())));

        let ctx = context(directory);
        let result = ctx.load().await;
        assert!(matches!(result, Err(DomainError::PermissionLoadFailed(_))));
        assert!(ctx.error().is_some());
        assert!(!ctx.can("pos.safe"));

        // No silent retry: a failed context rejects further loads.
        let retry = ctx.refresh().await;
        assert!(matches!(retry, Err(DomainError::ContextFailed)));
    }

    #[tokio::test]
    async fn test_load_timeout_fails_closed() {
        struct StalledDirectory;

        #[async_trait::async_trait]
        impl PermissionDirectory for StalledDirectory {
            async fn load_grants(
                &self,
                _user_id: &Uuid,
                _tenant_id: &Uuid,
            ) -> Result<HashMap<String, bool>, DomainError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(HashMap::new())
            }
        }

        let ctx = AuthorizationContext::new(
            Arc::new(StalledDirectory),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Duration::from_millis(20),
        );
        let result = ctx.load().await;
        assert!(matches!(result, Err(DomainError::PermissionLoadFailed(_))));
        assert!(!ctx.can("pos.safe"));
    }

    #[tokio::test]
    async fn test_torn_down_context_discards_inflight_load() {
        struct StalledDirectory;

        #[async_trait::async_trait]
        impl PermissionDirectory for StalledDirectory {
            async fn load_grants(
                &self,
                _user_id: &Uuid,
                _tenant_id: &Uuid,
            ) -> Result<HashMap<String, bool>, DomainError> {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(grants(&[("pos.safe", true)]))
            }
        }

        let ctx = Arc::new(AuthorizationContext::new(
            Arc::new(StalledDirectory),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Duration::from_secs(1),
        ));

        let loader = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.load().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.teardown();

        // The in-flight load completes without effect.
        loader.await.unwrap().unwrap();
        assert!(matches!(ctx.state(), PermissionState::Uninitialized));
        assert!(!ctx.can("pos.safe"));
    }

    #[tokio::test]
    async fn test_refresh_swaps_set_atomically() {
        let mut directory = MockPermissionDirectory::new();
        let mut first = true;
        directory.expect_load_grants().returning(move |_, _| {
            if std::mem::take(&mut first) {
                Ok(grants(&[("pos.safe", true)]))
            } else {
                Ok(grants(&[("pos.discount", true)]))
            }
        });

        let ctx = context(directory);
        ctx.load().await.unwrap();
        let before = ctx.permission_set().unwrap();

        ctx.refresh().await.unwrap();
        let after = ctx.permission_set().unwrap();

        // Whole-set replacement, never in-place mutation.
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.granted("pos.safe"));
        assert!(after.granted("pos.discount"));
        assert!(!after.granted("pos.safe"));
    }
}
