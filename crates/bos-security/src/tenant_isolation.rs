// crates/bos-security/src/tenant_isolation.rs
// ============================================================================
// Module: BOS Tenant Isolation Check
// Description: Verifies an actor's TenantScope covers the target tenant/branch.
// Purpose: Implement §4.5 "Tenant isolation" and the guard at §4.2 row 3.
// Dependencies: bos-core
// ============================================================================

//! ## Overview
//! Rejection messages are deliberately generic and never include the
//! business or branch identifier the actor was denied — the actor must not
//! learn that a foreign tenant or branch exists at all (§4.2 row 3, §8
//! property 5).

use bos_core::core::context::TenantScope;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;

/// The name this check reports as `policy_name` on denial.
pub const POLICY_NAME: &str = "tenant_isolation";

/// Checks whether `scope` authorizes `(business_id, branch_id)`.
///
/// Returns `None` when authorized, or a generic [`RejectionReason`] (never
/// naming the denied identifiers) when not.
#[must_use]
pub fn check(scope: &TenantScope, business_id: TenantId, branch_id: Option<BranchId>) -> Option<RejectionReason> {
    if !scope.authorizes_tenant(business_id) {
        return Some(RejectionReason::new(
            ReasonCode::PermissionDenied,
            "actor is not authorized for the requested business",
            POLICY_NAME,
        ));
    }
    if let Some(branch_id) = branch_id {
        if !scope.authorizes_branch(business_id, branch_id) {
            return Some(RejectionReason::new(
                ReasonCode::PermissionDenied,
                "actor is not authorized for the requested branch",
                POLICY_NAME,
            ));
        }
    }
    None
}
