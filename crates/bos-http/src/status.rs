// crates/bos-http/src/status.rs
// ============================================================================
// Module: Rejection Status Mapping
// Description: Maps a RejectionReason to an HTTP status-code hint (§6).
// Purpose: Give every transport adapter the same status-code choice for a
//          given rejection code without duplicating the mapping table.
// Dependencies: bos-core
// ============================================================================

use bos_core::ReasonCode;
use bos_core::RejectionReason;

/// Returns the HTTP status code a transport adapter should use for
/// `rejection`, per the table in §6.
///
/// This is a hint, not a mandate: a transport adapter may have its own
/// reasons to deviate (e.g. an internal RPC layer that only distinguishes
/// 2xx/4xx/5xx), but absent such reasons this mapping is authoritative.
#[must_use]
pub fn rejection_to_status_hint(rejection: &RejectionReason) -> u16 {
    match rejection.code() {
        ReasonCode::PermissionDenied
        | ReasonCode::PermissionMappingMissing
        | ReasonCode::PermissionScopeRequiredBranch
        | ReasonCode::ActorUnauthorizedBusiness
        | ReasonCode::ActorUnauthorizedBranch
        | ReasonCode::ActorInvalid
        | ReasonCode::ActorRequiredMissing
        | ReasonCode::AiExecutionForbidden
        | ReasonCode::ComplianceViolation
        | ReasonCode::SecurityAnomalyDetected => 403,

        ReasonCode::NoActiveContext
        | ReasonCode::InvalidCommandStructure
        | ReasonCode::InvalidCommandType
        | ReasonCode::InvalidNamespace
        | ReasonCode::InvalidContext
        | ReasonCode::BusinessIdMismatch
        | ReasonCode::BranchRequiredMissing
        | ReasonCode::BranchNotInBusiness => 400,

        ReasonCode::RateLimitExceeded => 429,

        ReasonCode::SystemDegraded | ReasonCode::FeatureDisabled | ReasonCode::DocumentFeatureDisabled => 503,

        ReasonCode::BusinessSuspended
        | ReasonCode::BusinessClosed
        | ReasonCode::BusinessLegalHold
        | ReasonCode::DocumentTemplateNotFound
        | ReasonCode::DocumentTemplateInvalid
        | ReasonCode::Engine(_) => 409,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(code: ReasonCode) -> RejectionReason {
        RejectionReason::new(code, "test", "test_policy")
    }

    #[test]
    fn permission_and_actor_denials_map_to_forbidden() {
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::PermissionDenied)), 403);
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::ActorUnauthorizedBranch)), 403);
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::AiExecutionForbidden)), 403);
    }

    #[test]
    fn validation_failures_map_to_bad_request() {
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::InvalidContext)), 400);
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::BranchRequiredMissing)), 400);
    }

    #[test]
    fn rate_limit_maps_to_too_many_requests() {
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::RateLimitExceeded)), 429);
    }

    #[test]
    fn degraded_system_and_disabled_features_map_to_service_unavailable() {
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::SystemDegraded)), 503);
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::FeatureDisabled)), 503);
    }

    #[test]
    fn engine_owned_business_rule_rejections_map_to_conflict() {
        assert_eq!(
            rejection_to_status_hint(&rejection(ReasonCode::Engine("INSUFFICIENT_STOCK".to_string()))),
            409
        );
        assert_eq!(rejection_to_status_hint(&rejection(ReasonCode::BusinessSuspended)), 409);
    }
}
