// crates/bos-core/src/core/rejection.rs
// ============================================================================
// Module: BOS Rejection Model
// Description: Closed rejection-code enumeration and the immutable rejection value.
// Purpose: Give every policy-driven denial a machine-readable code, a
//          human-readable message, and the name of the guard that produced it.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`RejectionReason`] is never constructed from a raw string code; it is
//! always built from a [`ReasonCode`] variant, so downstream matching on
//! rejection kind is exhaustive and typo-proof.

use serde::Deserialize;
use serde::Serialize;

/// Closed set of canonical rejection codes.
///
/// # Invariants
/// - This set is closed within the core pipeline; engines may still surface
///   engine-owned business-rule codes (the `Engine(String)` escape hatch),
///   but every pipeline-level guard uses a named variant, never a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// No active business context was presented.
    NoActiveContext,
    /// The business lifecycle state is `SUSPENDED`.
    BusinessSuspended,
    /// The business lifecycle state is `CLOSED`.
    BusinessClosed,
    /// The business lifecycle state is `LEGAL_HOLD`.
    BusinessLegalHold,
    /// `business_id` did not match the active tenant.
    BusinessIdMismatch,
    /// `branch_id` was present but does not belong to the business.
    BranchNotInBusiness,
    /// Scope requirement is `BRANCH_REQUIRED` but no branch was given.
    BranchRequiredMissing,
    /// The command value did not satisfy structural invariants.
    InvalidCommandStructure,
    /// The command's intent is not a recognised command type.
    InvalidCommandType,
    /// The command's intent does not belong to a known namespace.
    InvalidNamespace,
    /// Permission evaluation denied the command.
    PermissionDenied,
    /// The intent has no permission mapping.
    PermissionMappingMissing,
    /// A branch-scoped command requires a branch-scope grant.
    PermissionScopeRequiredBranch,
    /// The command requires an actor but none was presented.
    ActorRequiredMissing,
    /// The actor kind or identifier was invalid.
    ActorInvalid,
    /// The actor is not authorised for the target business.
    ActorUnauthorizedBusiness,
    /// The actor is not authorised for the target branch.
    ActorUnauthorizedBranch,
    /// The governing feature flag is disabled.
    FeatureDisabled,
    /// The compliance provider reported a violation.
    ComplianceViolation,
    /// No document template could be resolved.
    DocumentTemplateNotFound,
    /// The resolved document template failed validation.
    DocumentTemplateInvalid,
    /// The document designer feature flag is disabled.
    DocumentFeatureDisabled,
    /// An AI actor attempted a forbidden or ungranted action.
    AiExecutionForbidden,
    /// The rate limiter denied the command.
    RateLimitExceeded,
    /// The anomaly detector returned a BLOCK-severity result.
    SecurityAnomalyDetected,
    /// `SystemHealth` is not `NORMAL` and the command is a write.
    SystemDegraded,
    /// Header and body context values did not match.
    InvalidContext,
    /// Engine-owned rejection code not part of the closed pipeline set.
    Engine(String),
}

impl ReasonCode {
    /// Returns a stable machine-readable string for the code, used at the
    /// JSON/HTTP edge.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoActiveContext => "NO_ACTIVE_CONTEXT",
            Self::BusinessSuspended => "BUSINESS_SUSPENDED",
            Self::BusinessClosed => "BUSINESS_CLOSED",
            Self::BusinessLegalHold => "BUSINESS_LEGAL_HOLD",
            Self::BusinessIdMismatch => "BUSINESS_ID_MISMATCH",
            Self::BranchNotInBusiness => "BRANCH_NOT_IN_BUSINESS",
            Self::BranchRequiredMissing => "BRANCH_REQUIRED_MISSING",
            Self::InvalidCommandStructure => "INVALID_COMMAND_STRUCTURE",
            Self::InvalidCommandType => "INVALID_COMMAND_TYPE",
            Self::InvalidNamespace => "INVALID_NAMESPACE",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PermissionMappingMissing => "PERMISSION_MAPPING_MISSING",
            Self::PermissionScopeRequiredBranch => "PERMISSION_SCOPE_REQUIRED_BRANCH",
            Self::ActorRequiredMissing => "ACTOR_REQUIRED_MISSING",
            Self::ActorInvalid => "ACTOR_INVALID",
            Self::ActorUnauthorizedBusiness => "ACTOR_UNAUTHORIZED_BUSINESS",
            Self::ActorUnauthorizedBranch => "ACTOR_UNAUTHORIZED_BRANCH",
            Self::FeatureDisabled => "FEATURE_DISABLED",
            Self::ComplianceViolation => "COMPLIANCE_VIOLATION",
            Self::DocumentTemplateNotFound => "DOCUMENT_TEMPLATE_NOT_FOUND",
            Self::DocumentTemplateInvalid => "DOCUMENT_TEMPLATE_INVALID",
            Self::DocumentFeatureDisabled => "DOCUMENT_FEATURE_DISABLED",
            Self::AiExecutionForbidden => "AI_EXECUTION_FORBIDDEN",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::SecurityAnomalyDetected => "SECURITY_ANOMALY_DETECTED",
            Self::SystemDegraded => "SYSTEM_DEGRADED",
            Self::InvalidContext => "INVALID_CONTEXT",
            Self::Engine(code) => code,
        }
    }
}

/// Immutable `(code, message, policy_name)` rejection value.
///
/// # Invariants
/// - Once constructed, no field can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    code: ReasonCode,
    message: String,
    policy_name: String,
}

impl RejectionReason {
    /// Builds a rejection reason.
    #[must_use]
    pub fn new(code: ReasonCode, message: impl Into<String>, policy_name: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            policy_name: policy_name.into(),
        }
    }

    /// Returns the rejection code.
    #[must_use]
    pub const fn code(&self) -> &ReasonCode {
        &self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the name of the guard or policy that produced this rejection.
    #[must_use]
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }
}
