// ============================================================================
// Shopfront Core - Permission Set
// File: crates/shopfront-core/src/domain/permission.rs
// Description: Immutable per-context set of granted permission codes
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable mapping from permission code to grant state, loaded once per
/// authorization context (one user within one tenant).
///
/// Codes are opaque dotted strings (`"pos.safe"`, `"orders.refund"`). The
/// dots are a naming convention for humans; no wildcard or prefix expansion
/// happens here. A code absent from the set is not granted.
///
/// Polarity: `granted(code) == true` always means the capability is
/// available (the restriction is lifted), regardless of how the backing
/// directory stores its records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    grants: HashMap<String, bool>,
}

impl PermissionSet {
    pub fn new(grants: HashMap<String, bool>) -> Self {
        Self { grants }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Grant state for one code; absent codes are not granted.
    pub fn granted(&self, code: &str) -> bool {
        self.grants.get(code).copied().unwrap_or(false)
    }

    /// True iff every code is granted. Empty input is vacuously true.
    pub fn granted_all<'a, I>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes.into_iter().all(|code| self.granted(code))
    }

    /// True iff at least one code is granted. Empty input is false.
    pub fn granted_any<'a, I>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes.into_iter().any(|code| self.granted(code))
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl FromIterator<(String, bool)> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self { grants: iter.into_iter().collect() }
    }
}
