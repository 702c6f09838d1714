// crates/bos-providers/src/compliance.rs
// ============================================================================
// Module: In-Memory Compliance Provider
// Description: Reference implementation of `ComplianceProvider`.
// Purpose: Evaluate a small, declaratively-configured rule set against a
//          command's payload so tests can exercise the compliance guard
//          without a real compliance engine.
// Dependencies: bos-core, std::sync
// ============================================================================

//! ## Overview
//! Rules are intentionally simple: "commands whose intent starts with this
//! prefix must carry this payload field". Real deployments replace this with
//! a provider backed by an actual rules engine; the guard only depends on the
//! [`ComplianceProvider`] trait.

use std::sync::RwLock;

use bos_core::core::command::Command;
use bos_core::core::context::BusinessContext;
use bos_core::interfaces::providers::ComplianceProvider;
use bos_core::interfaces::providers::ComplianceProviderError;
use bos_core::interfaces::providers::ComplianceResult;
use bos_core::interfaces::providers::Violation;

/// A single declarative compliance rule.
#[derive(Debug, Clone)]
pub struct RequiredFieldRule {
    /// Commands whose intent starts with this prefix are checked.
    pub intent_prefix: String,
    /// The payload field that must be present and non-null.
    pub required_field: String,
    /// The violation message surfaced when the field is missing.
    pub message: String,
}

/// In-memory, test-double [`ComplianceProvider`].
#[derive(Debug, Default)]
pub struct InMemoryComplianceProvider {
    rules: RwLock<Vec<RequiredFieldRule>>,
}

impl InMemoryComplianceProvider {
    /// Creates a provider with no rules (every command is compliant).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required-field rule.
    pub fn add_rule(&self, rule: RequiredFieldRule) {
        self.rules.write().unwrap_or_else(std::sync::PoisonError::into_inner).push(rule);
    }
}

impl ComplianceProvider for InMemoryComplianceProvider {
    fn evaluate(
        &self,
        command: &Command,
        _context: &dyn BusinessContext,
    ) -> Result<ComplianceResult, ComplianceProviderError> {
        let rules = self.rules.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let violations: Vec<Violation> = rules
            .iter()
            .filter(|rule| command.intent().starts_with(rule.intent_prefix.as_str()))
            .filter(|rule| !command.payload().contains_key(&rule.required_field))
            .map(|rule| Violation { message: rule.message.clone() })
            .collect();
        Ok(ComplianceResult { allowed: violations.is_empty(), rejection_code: None, violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bos_core::core::command::ActorKind;
    use bos_core::core::command::ActorRequirement;
    use bos_core::core::command::CommandKind;
    use bos_core::core::command::CommandSpec;
    use bos_core::core::command::ScopeRequirement;
    use bos_core::core::identifiers::ActorId;
    use bos_core::core::identifiers::CorrelationId;
    use bos_core::core::identifiers::TenantId;
    use serde_json::Map;
    use time::OffsetDateTime;

    struct NullContext;
    impl BusinessContext for NullContext {
        fn has_active_context(&self) -> bool {
            true
        }
        fn active_business_id(&self) -> Option<bos_core::core::identifiers::TenantId> {
            None
        }
        fn lifecycle(&self) -> bos_core::core::context::BusinessLifecycle {
            bos_core::core::context::BusinessLifecycle::Active
        }
        fn is_branch_in_business(&self, _branch_id: bos_core::core::identifiers::BranchId) -> bool {
            true
        }
    }

    fn cash_command(payload: Map<String, serde_json::Value>) -> Command {
        Command::new(CommandSpec {
            intent: "cash.session.open.request".to_string(),
            tenant_id: TenantId::new(),
            branch_id: None,
            actor_kind: ActorKind::Human,
            actor_id: ActorId::new("user-1").expect("valid"),
            payload,
            issued_at: OffsetDateTime::now_utc(),
            correlation_id: CorrelationId::new(),
            scope_requirement: ScopeRequirement::BusinessAllowed,
            actor_requirement: ActorRequirement::ActorRequired,
            kind: CommandKind::Write,
        })
        .expect("valid command")
    }

    #[test]
    fn no_rules_always_allows() {
        let provider = InMemoryComplianceProvider::new();
        let result = provider.evaluate(&cash_command(Map::new()), &NullContext).expect("ok");
        assert!(result.allowed);
    }

    #[test]
    fn missing_required_field_is_a_violation() {
        let provider = InMemoryComplianceProvider::new();
        provider.add_rule(RequiredFieldRule {
            intent_prefix: "cash.".to_string(),
            required_field: "drawer_id".to_string(),
            message: "drawer_id is required for cash operations".to_string(),
        });
        let result = provider.evaluate(&cash_command(Map::new()), &NullContext).expect("ok");
        assert!(!result.allowed);
        assert_eq!(result.violations.len(), 1);
    }
}
