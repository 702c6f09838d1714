// crates/bos-security/src/ai_guardrail.rs
// ============================================================================
// Module: BOS AI Advisory Boundary
// Description: Classifies AI actions and denies autonomous state mutation
//              absent an explicit policy grant.
// Purpose: Implement §4.5 "AI guardrail" and the guard at §4.2 row 11.
// Dependencies: bos-core
// ============================================================================

//! ## Overview
//! Six action classes (§4.5): `ANALYZE`, `RECOMMEND`, `SIMULATE`, and
//! `FLAG_ANOMALY` are always allowed within-tenant; `PREPARE_COMMAND` is
//! allowed but flagged `requires_human_approval`; `EXECUTE_COMMAND` requires
//! an explicit automation-policy grant. A fixed operation-name blocklist
//! (§4.5, §8 property 8) is denied regardless of action class or grant, and
//! any cross-tenant attempt by an AI actor is an unconditional denial.

use bos_core::core::identifiers::TenantId;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;

/// The name this guardrail reports as `policy_name` on denial.
pub const POLICY_NAME: &str = "ai_guardrail";

/// Operation names permanently forbidden to AI actors, regardless of policy
/// grant or action class (§4.5).
pub const FORBIDDEN_OPERATIONS: &[&str] = &[
    "payment_authorization",
    "contract_signing",
    "borrowing",
    "deletion",
    "cross_tenant_access",
    "staff_changes",
    "historical_record_alteration",
];

/// The class of action an AI actor is attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    /// Read-only analysis of existing state.
    Analyze,
    /// Produces a recommendation for a human to act on.
    Recommend,
    /// Runs a what-if simulation with no side effects.
    Simulate,
    /// Flags a detected anomaly for human review.
    FlagAnomaly,
    /// Prepares a command for a human to approve and submit.
    PrepareCommand,
    /// Executes a command autonomously.
    ExecuteCommand,
}

/// Everything the guardrail needs to classify one AI action.
#[derive(Debug, Clone)]
pub struct AiActionRequest<'a> {
    /// The class of action being attempted.
    pub action: AiAction,
    /// The underlying operation name, checked against [`FORBIDDEN_OPERATIONS`].
    pub operation: &'a str,
    /// The tenant the AI actor is authorized within.
    pub actor_tenant: TenantId,
    /// The tenant the action targets.
    pub target_tenant: TenantId,
    /// Whether an explicit automation policy grants this actor autonomous execution.
    pub has_automation_policy: bool,
}

/// The outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiGuardrailVerdict {
    /// The action is allowed.
    Allowed {
        /// Whether the outcome must be flagged as requiring human approval
        /// before it takes effect (true for `PREPARE_COMMAND`).
        requires_human_approval: bool,
    },
    /// The action is denied.
    Denied(RejectionReason),
}

/// Classifies and evaluates one AI action request.
#[must_use]
pub fn evaluate(request: &AiActionRequest<'_>) -> AiGuardrailVerdict {
    if FORBIDDEN_OPERATIONS.contains(&request.operation) {
        return AiGuardrailVerdict::Denied(RejectionReason::new(
            ReasonCode::AiExecutionForbidden,
            format!("operation `{}` is permanently forbidden to AI actors", request.operation),
            POLICY_NAME,
        ));
    }

    if request.actor_tenant != request.target_tenant {
        return AiGuardrailVerdict::Denied(RejectionReason::new(
            ReasonCode::AiExecutionForbidden,
            "AI actors may not act across tenant boundaries",
            POLICY_NAME,
        ));
    }

    match request.action {
        AiAction::Analyze | AiAction::Recommend | AiAction::Simulate | AiAction::FlagAnomaly => {
            AiGuardrailVerdict::Allowed { requires_human_approval: false }
        }
        AiAction::PrepareCommand => AiGuardrailVerdict::Allowed { requires_human_approval: true },
        AiAction::ExecuteCommand => {
            if request.has_automation_policy {
                AiGuardrailVerdict::Allowed { requires_human_approval: false }
            } else {
                AiGuardrailVerdict::Denied(RejectionReason::new(
                    ReasonCode::AiExecutionForbidden,
                    "autonomous execution requires an explicit automation policy grant",
                    POLICY_NAME,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: AiAction, operation: &str, has_automation_policy: bool) -> AiActionRequest<'_> {
        let tenant = TenantId::new();
        AiActionRequest { action, operation, actor_tenant: tenant, target_tenant: tenant, has_automation_policy }
    }

    #[test]
    fn forbidden_operations_deny_every_action_class() {
        for operation in FORBIDDEN_OPERATIONS {
            for action in [
                AiAction::Analyze,
                AiAction::Recommend,
                AiAction::Simulate,
                AiAction::FlagAnomaly,
                AiAction::PrepareCommand,
                AiAction::ExecuteCommand,
            ] {
                let verdict = evaluate(&request(action, operation, true));
                assert!(matches!(verdict, AiGuardrailVerdict::Denied(_)), "{operation} / {action:?} should deny");
            }
        }
    }

    #[test]
    fn read_only_actions_allowed_same_tenant() {
        for action in [AiAction::Analyze, AiAction::Recommend, AiAction::Simulate, AiAction::FlagAnomaly] {
            let verdict = evaluate(&request(action, "auto_reorder", false));
            assert_eq!(verdict, AiGuardrailVerdict::Allowed { requires_human_approval: false });
        }
    }

    #[test]
    fn prepare_command_requires_human_approval_flag() {
        let verdict = evaluate(&request(AiAction::PrepareCommand, "auto_reorder", false));
        assert_eq!(verdict, AiGuardrailVerdict::Allowed { requires_human_approval: true });
    }

    #[test]
    fn execute_command_allowed_iff_automation_policy_granted() {
        assert!(matches!(
            evaluate(&request(AiAction::ExecuteCommand, "auto_reorder", false)),
            AiGuardrailVerdict::Denied(_)
        ));
        assert_eq!(
            evaluate(&request(AiAction::ExecuteCommand, "auto_reorder", true)),
            AiGuardrailVerdict::Allowed { requires_human_approval: false }
        );
    }

    #[test]
    fn cross_tenant_attempt_is_unconditional_denial() {
        let verdict = evaluate(&AiActionRequest {
            action: AiAction::Analyze,
            operation: "auto_reorder",
            actor_tenant: TenantId::new(),
            target_tenant: TenantId::new(),
            has_automation_policy: true,
        });
        assert!(matches!(verdict, AiGuardrailVerdict::Denied(_)));
    }
}
