// crates/bos-dispatcher/src/guards.rs
// ============================================================================
// Module: BOS Guard Stack — Dispatcher-Owned Checks
// Description: Pure decision functions for the guards the dispatcher itself
//              resolves data for: scope, feature-flag canonicalisation, actor
//              scope authorization, permission, and document-template
//              resolution. Resilience, tenant isolation, the rate limiter,
//              the anomaly detector, and the AI guardrail live in
//              `bos-security` and are called directly by `Dispatcher::dispatch`.
// Purpose: Implement §4.2 guard rows 2, 6, 7, 8, 10 as functions that take
//          already-fetched data, leaving provider I/O and its fail-open /
//          fail-closed policy entirely to `Dispatcher::dispatch`.
// Dependencies: bos-core
// ============================================================================

//! ## Overview
//! Every function here is pure: given the same inputs it always returns the
//! same verdict, which is what makes the guard stack's ordering and
//! short-circuiting easy to reason about and to test in isolation.

use bos_core::core::command::Command;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::context::ActorContext;
use bos_core::core::context::BusinessContext;
use bos_core::core::context::BusinessLifecycle;
use bos_core::core::identifiers::BranchId;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use bos_core::interfaces::providers::DocumentTemplate;
use bos_core::interfaces::providers::FeatureFlagState;
use bos_core::interfaces::providers::FlagStatus;
use bos_core::interfaces::providers::GrantScope;
use bos_core::interfaces::providers::Permission;
use bos_core::interfaces::providers::ScopeGrant;
use bos_core::interfaces::providers::TemplateStatus;

// ============================================================================
// SECTION: Scope Guard (§4.2 row 2)
// ============================================================================

/// The name this guard reports as `policy_name` on denial.
pub const SCOPE_POLICY_NAME: &str = "scope_guard";

/// Validates the command's target tenant and branch against the active
/// [`BusinessContext`]: an active context must be present, the business must
/// be `ACTIVE`, the command's tenant must match the context's tenant, and any
/// named branch must belong to that business.
#[must_use]
pub fn check_scope(command: &Command, context: &dyn BusinessContext) -> Option<RejectionReason> {
    if !context.has_active_context() {
        return Some(RejectionReason::new(ReasonCode::NoActiveContext, "no active business context is present", SCOPE_POLICY_NAME));
    }
    match context.lifecycle() {
        BusinessLifecycle::Suspended => {
            return Some(RejectionReason::new(ReasonCode::BusinessSuspended, "business is suspended", SCOPE_POLICY_NAME));
        }
        BusinessLifecycle::Closed => {
            return Some(RejectionReason::new(ReasonCode::BusinessClosed, "business is closed", SCOPE_POLICY_NAME));
        }
        BusinessLifecycle::LegalHold => {
            return Some(RejectionReason::new(ReasonCode::BusinessLegalHold, "business is under legal hold", SCOPE_POLICY_NAME));
        }
        BusinessLifecycle::Active => {}
    }
    match context.active_business_id() {
        Some(active) if active == command.tenant_id() => {}
        _ => {
            return Some(RejectionReason::new(ReasonCode::BusinessIdMismatch, "command tenant does not match the active business", SCOPE_POLICY_NAME));
        }
    }
    if let Some(branch_id) = command.branch_id() {
        if !context.is_branch_in_business(branch_id) {
            return Some(RejectionReason::new(ReasonCode::BranchNotInBusiness, "branch does not belong to the active business", SCOPE_POLICY_NAME));
        }
    }
    None
}

// ============================================================================
// SECTION: Actor Scope Authorization (§4.2 row 7)
// ============================================================================

/// The name this guard reports as `policy_name` on denial.
pub const ACTOR_SCOPE_POLICY_NAME: &str = "actor_scope_guard";

/// Authorizes the issuing actor against the command's target business and
/// branch. Commands marked `SYSTEM_ALLOWED` bypass actor authorization
/// entirely — they are the pipeline's own internal reactions, not actor-issued
/// requests (§4.2 row 7 note).
///
/// Must run before [`check_permission`] (§9 design note: actor scope before
/// permission, not the reverse).
#[must_use]
pub fn check_actor_scope(command: &Command, actor: &ActorContext, context: &dyn BusinessContext) -> Option<RejectionReason> {
    use bos_core::core::command::ActorRequirement;
    if matches!(command.actor_requirement(), ActorRequirement::SystemAllowed) {
        return None;
    }
    if !context.authorize_business(actor) {
        return Some(RejectionReason::new(ReasonCode::ActorUnauthorizedBusiness, "actor is not authorized for this business", ACTOR_SCOPE_POLICY_NAME));
    }
    if let Some(branch_id) = command.branch_id() {
        if !context.authorize_branch(actor, branch_id) {
            return Some(RejectionReason::new(ReasonCode::ActorUnauthorizedBranch, "actor is not authorized for this branch", ACTOR_SCOPE_POLICY_NAME));
        }
    }
    None
}

// ============================================================================
// SECTION: Permission Guard (§4.2 row 8)
// ============================================================================

/// The name this guard reports as `policy_name` on denial.
pub const PERMISSION_POLICY_NAME: &str = "permission_guard";

/// Deny-by-default permission check against already-fetched grants.
///
/// A branch-scoped command requires a grant naming that exact branch; a
/// business-level grant alone does not authorize it
/// (`PERMISSION_SCOPE_REQUIRED_BRANCH`).
#[must_use]
pub fn check_permission(command: &Command, permission: Option<&Permission>, grants: &[ScopeGrant]) -> Option<RejectionReason> {
    let Some(permission) = permission else {
        return Some(RejectionReason::new(
            ReasonCode::PermissionMappingMissing,
            format!("intent `{}` has no permission mapping", command.intent()),
            PERMISSION_POLICY_NAME,
        ));
    };

    let has_branch_grant = command.branch_id().is_some_and(|branch_id| {
        grants.iter().any(|grant| {
            &grant.permission == permission
                && matches!(grant.scope, GrantScope::Branch(tenant, branch) if tenant == command.tenant_id() && branch == branch_id)
        })
    });
    if has_branch_grant {
        return None;
    }

    let has_business_grant = grants
        .iter()
        .any(|grant| &grant.permission == permission && matches!(grant.scope, GrantScope::Business(tenant) if tenant == command.tenant_id()));
    if has_business_grant {
        return if matches!(command.scope_requirement(), ScopeRequirement::BranchRequired) {
            Some(RejectionReason::new(
                ReasonCode::PermissionScopeRequiredBranch,
                "a business-level grant does not authorize a branch-scoped command",
                PERMISSION_POLICY_NAME,
            ))
        } else {
            None
        };
    }

    Some(RejectionReason::new(ReasonCode::PermissionDenied, "actor holds no grant for the required permission", PERMISSION_POLICY_NAME))
}

// ============================================================================
// SECTION: Feature Flag Canonicalisation (§4.2 row 6, §9 design note)
// ============================================================================

/// Resolves the canonical [`FlagStatus`] for `flag_key` at `branch_id`,
/// preferring a branch-scoped record over a business-wide one and resolving
/// duplicate records within the chosen scope by: `DISABLED` dominates
/// `ENABLED`, then later `created_at` wins, with the earliest-seen record
/// kept on a full tie.
///
/// Returns `None` when no record names this flag at either scope — callers
/// decide what absence means for their guard.
#[must_use]
pub fn resolve_flag(records: &[FeatureFlagState], flag_key: &str, branch_id: Option<BranchId>) -> Option<FlagStatus> {
    if let Some(branch_id) = branch_id {
        let scoped = records.iter().filter(|record| record.flag_key == flag_key && record.branch_id == Some(branch_id));
        if let Some(winner) = pick_flag_winner(scoped) {
            return Some(winner.status);
        }
    }
    let business_wide = records.iter().filter(|record| record.flag_key == flag_key && record.branch_id.is_none());
    pick_flag_winner(business_wide).map(|winner| winner.status)
}

fn pick_flag_winner<'a>(candidates: impl Iterator<Item = &'a FeatureFlagState>) -> Option<&'a FeatureFlagState> {
    candidates.fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            let candidate_disabled = matches!(candidate.status, FlagStatus::Disabled);
            let current_disabled = matches!(current.status, FlagStatus::Disabled);
            if candidate_disabled != current_disabled {
                if candidate_disabled { Some(candidate) } else { Some(current) }
            } else if candidate.created_at > current.created_at {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

// ============================================================================
// SECTION: Document Template Resolution (§4.2 row 10)
// ============================================================================

/// Resolves the canonical active template for `doc_type` at `branch_id`,
/// preferring a branch-scoped template over a business-wide one, then the
/// highest `version`, then the latest `created_at`, then the
/// lexicographically largest `template_id` on a full tie. Only `ACTIVE`
/// templates are eligible.
#[must_use]
pub fn resolve_template<'a>(templates: &'a [DocumentTemplate], doc_type: &str, branch_id: Option<BranchId>) -> Option<&'a DocumentTemplate> {
    if let Some(branch_id) = branch_id {
        let scoped = templates.iter().filter(|t| t.doc_type == doc_type && t.branch_id == Some(branch_id));
        if let Some(winner) = pick_template_winner(scoped) {
            return Some(winner);
        }
    }
    let business_wide = templates.iter().filter(|t| t.doc_type == doc_type && t.branch_id.is_none());
    pick_template_winner(business_wide)
}

fn pick_template_winner<'a>(candidates: impl Iterator<Item = &'a DocumentTemplate>) -> Option<&'a DocumentTemplate> {
    candidates.filter(|t| matches!(t.status, TemplateStatus::Active)).fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            if candidate.version != current.version {
                if candidate.version > current.version { Some(candidate) } else { Some(current) }
            } else if candidate.created_at != current.created_at {
                if candidate.created_at > current.created_at { Some(candidate) } else { Some(current) }
            } else if candidate.template_id > current.template_id {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

/// The name this guard reports as `policy_name` on denial.
pub const DOCUMENT_POLICY_NAME: &str = "document_guard";

/// Validates that `payload` supplies every field `template` requires.
#[must_use]
pub fn check_required_fields(template: &DocumentTemplate, payload: &bos_core::core::command::Payload) -> Option<RejectionReason> {
    let missing: Vec<&str> = template.required_fields.iter().filter(|field| !payload.contains_key(field.as_str())).map(String::as_str).collect();
    if missing.is_empty() {
        return None;
    }
    Some(RejectionReason::new(
        ReasonCode::DocumentTemplateInvalid,
        format!("document template `{}` is missing required fields: {}", template.template_id, missing.join(", ")),
        DOCUMENT_POLICY_NAME,
    ))
}
