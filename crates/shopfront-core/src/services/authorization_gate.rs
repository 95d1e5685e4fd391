// ============================================================================
// Shopfront Core - Authorization Gate
// File: crates/shopfront-core/src/services/authorization_gate.rs
// ============================================================================
//! Higher-order wrapper hiding or substituting protected units of work.

use tracing::debug;

use crate::services::permission_evaluator::PermissionEvaluator;

/// How a gate treats a restricted unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateOptions {
    /// Render/run nothing instead of the fallback when restricted.
    pub hide_on_restricted: bool,
}

/// Verdict for one required code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The protected unit runs unchanged.
    Permitted,
    /// Restricted; the fallback unit runs instead.
    Fallback,
    /// Restricted and hidden; nothing runs.
    Hidden,
}

/// Wraps protected units with a permission check.
///
/// A context that is still loading counts as restricted: the protected unit
/// is withheld until the verdict is known, never shown optimistically. The
/// gate itself introduces no side effects.
pub struct AuthorizationGate<'a> {
    evaluator: &'a dyn PermissionEvaluator,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(evaluator: &'a dyn PermissionEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn decide(&self, required_code: &str, options: GateOptions) -> GateDecision {
        // loading, failed, and denied all land on the restricted branch; the
        // evaluator already fails closed for everything but a loaded grant.
        if self.evaluator.can(required_code) {
            return GateDecision::Permitted;
        }
        debug!(code = required_code, "Gate restricted unit");
        if options.hide_on_restricted {
            GateDecision::Hidden
        } else {
            GateDecision::Fallback
        }
    }

    /// Wrap a protected value.
    ///
    /// Returns the value unchanged when permitted, the fallback when
    /// restricted (unless hidden), `None` when nothing should render/run.
    pub fn guard<T>(
        &self,
        required_code: &str,
        protected: T,
        fallback: Option<T>,
        options: GateOptions,
    ) -> Option<T> {
        match self.decide(required_code, options) {
            GateDecision::Permitted => Some(protected),
            GateDecision::Fallback => fallback,
            GateDecision::Hidden => None,
        }
    }

    /// Wrap a protected operation, running the fallback closure when
    /// restricted. The returned unit has the same external signature as the
    /// protected one.
    pub fn guard_fn<T>(
        &self,
        required_code: &str,
        protected: impl FnOnce() -> T,
        fallback: Option<impl FnOnce() -> T>,
        options: GateOptions,
    ) -> Option<T> {
        match self.decide(required_code, options) {
            GateDecision::Permitted => Some(protected()),
            GateDecision::Fallback => fallback.map(|f| f()),
            GateDecision::Hidden => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEvaluator {
        granted: Vec<&'static str>,
        loading: bool,
    }

    impl PermissionEvaluator for FixedEvaluator {
        fn can(&self, code: &str) -> bool {
            !self.loading && self.granted.contains(&code)
        }
        fn can_all(&self, codes: &[&str]) -> bool {
            !self.loading && codes.iter().all(|c| self.can(c))
        }
        fn can_any(&self, codes: &[&str]) -> bool {
            !self.loading && codes.iter().any(|c| self.can(c))
        }
        fn loading(&self) -> bool {
            self.loading
        }
        fn error(&self) -> Option<String> {
            None
        }
    }

    fn evaluator(granted: Vec<&'static str>) -> FixedEvaluator {
        FixedEvaluator { granted, loading: false }
    }

    #[test]
    fn test_granted_code_runs_protected_unit_unchanged() {
        let eval = evaluator(vec!["pos.safe"]);
        let gate = AuthorizationGate::new(&eval);
        let result = gate.guard("pos.safe", "open-drawer", Some("locked"), GateOptions::default());
        assert_eq!(result, Some("open-drawer"));
    }

    #[test]
    fn test_denied_code_runs_fallback() {
        let eval = evaluator(vec![]);
        let gate = AuthorizationGate::new(&eval);
        let result = gate.guard("pos.safe", "open-drawer", Some("locked"), GateOptions::default());
        assert_eq!(result, Some("locked"));
    }

    #[test]
    fn test_denied_code_with_hide_runs_nothing() {
        let eval = evaluator(vec![]);
        let gate = AuthorizationGate::new(&eval);
        let result = gate.guard(
            "pos.safe",
            "open-drawer",
            Some("locked"),
            GateOptions { hide_on_restricted: true },
        );
        assert_eq!(result, None);
    }

    #[test]
    fn test_denied_without_fallback_yields_nothing() {
        let eval = evaluator(vec![]);
        let gate = AuthorizationGate::new(&eval);
        let result: Option<&str> =
            gate.guard("pos.safe", "open-drawer", None, GateOptions::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_loading_withholds_protected_unit() {
        let eval = FixedEvaluator { granted: vec!["pos.safe"], loading: true };
        let gate = AuthorizationGate::new(&eval);
        // Treated as restricted until loading clears, never optimistic.
        assert_eq!(gate.decide("pos.safe", GateOptions::default()), GateDecision::Fallback);
        assert_eq!(
            gate.decide("pos.safe", GateOptions { hide_on_restricted: true }),
            GateDecision::Hidden
        );
    }

    #[test]
    fn test_guard_fn_runs_only_selected_closure() {
        let eval = evaluator(vec!["orders.refund"]);
        let gate = AuthorizationGate::new(&eval);

        let mut protected_ran = false;
        let mut fallback_ran = false;
        gate.guard_fn(
            "orders.refund",
            || protected_ran = true,
            Some(|| fallback_ran = true),
            GateOptions::default(),
        );
        assert!(protected_ran);
        assert!(!fallback_ran);
    }

    #[test]
    fn test_guard_fn_fallback_on_denied() {
        let eval = evaluator(vec![]);
        let gate = AuthorizationGate::new(&eval);

        let result = gate.guard_fn(
            "orders.refund",
            || "refunded",
            Some(|| "refused"),
            GateOptions::default(),
        );
        assert_eq!(result, Some("refused"));
    }
}
