// crates/bos-http/src/resolver.rs
// ============================================================================
// Module: HTTP Context Resolver
// Description: Resolves an inbound request's headers and body into an
//              ActorContext/BusinessContext pair (§4.6).
// Purpose: Centralise API-key authentication, tenant/branch header-body
//          consistency checking, and actor-type normalisation so every BOS
//          transport adapter performs them identically.
// Dependencies: bos-core, crate::lookup
// ============================================================================

//! ## Overview
//! Resolution happens in three stages: authenticate the `X-API-KEY` header
//! against an [`AuthProvider`](bos_core::interfaces::providers::AuthProvider)
//! to obtain a principal, normalise its raw actor type into the closed
//! [`ActorKind`] set, then cross-check the `X-BUSINESS-ID`/`X-BRANCH-ID`
//! headers against any same-named body fields. A mismatch between header and
//! body is always `INVALID_CONTEXT` — this crate never guesses which of the
//! two the caller meant. The actor-scope authorization policy runs as a
//! final sanity gate: a principal who authenticates successfully but holds
//! no grant for the targeted business or branch is rejected here rather than
//! being handed to the dispatcher with a context it would have to re-derive
//! the same grants to deny.

use std::collections::BTreeSet;

use bos_core::core::context::BranchAllowance;
use bos_core::core::context::BusinessLifecycle;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::AuthPrincipal;
use bos_core::interfaces::providers::AuthProvider;
use bos_core::ActorContext;
use bos_core::ActorKind;
use bos_core::BusinessContext;
use bos_core::ReasonCode;
use bos_core::RejectionReason;
use bos_core::TenantScope;

use crate::lookup::BodyLookup;
use crate::lookup::HeaderLookup;

/// Header carrying the caller's opaque API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";
/// Header carrying the target business (tenant) id.
pub const BUSINESS_ID_HEADER: &str = "X-BUSINESS-ID";
/// Header carrying the optional target branch id.
pub const BRANCH_ID_HEADER: &str = "X-BRANCH-ID";

const POLICY_NAME: &str = "http_context_resolver";

/// A [`BusinessContext`] built from an authenticated principal's allowed
/// tenant/branch scope.
///
/// # Invariants
/// - `is_branch_in_business` always returns `true`: branch-to-business
///   topology is a catalogue concern the resolver has no access to: a
///   production deployment wraps this context (or substitutes its own) to
///   add that check ahead of the dispatcher.
#[derive(Debug, Clone)]
pub struct ResolvedBusinessContext {
    tenant_id: TenantId,
    lifecycle: BusinessLifecycle,
    scope: TenantScope,
}

impl ResolvedBusinessContext {
    fn new(tenant_id: TenantId, principal: &AuthPrincipal) -> Self {
        let mut scope = TenantScope::new();
        for business_id in &principal.allowed_business_ids {
            let branches = principal
                .allowed_branch_ids_by_business
                .get(business_id)
                .map(|branches| BranchAllowance::Concrete(branches.clone()))
                .unwrap_or(BranchAllowance::Concrete(BTreeSet::new()));
            scope = scope.with_tenant(*business_id, branches);
        }
        Self {
            tenant_id,
            lifecycle: BusinessLifecycle::Active,
            scope,
        }
    }

    /// Overrides the default `Active` lifecycle with a host-supplied lookup.
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: BusinessLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

impl BusinessContext for ResolvedBusinessContext {
    fn has_active_context(&self) -> bool {
        true
    }

    fn active_business_id(&self) -> Option<TenantId> {
        Some(self.tenant_id)
    }

    fn lifecycle(&self) -> BusinessLifecycle {
        self.lifecycle
    }

    fn is_branch_in_business(&self, _branch_id: BranchId) -> bool {
        true
    }

    fn authorize_business(&self, _actor: &ActorContext) -> bool {
        self.scope.authorizes_tenant(self.tenant_id)
    }

    fn authorize_branch(&self, _actor: &ActorContext, branch_id: BranchId) -> bool {
        self.scope.authorizes_branch(self.tenant_id, branch_id)
    }
}

/// Normalises a provider's raw actor-type string into the closed `ActorKind`
/// set, accepting `USER` as a synonym for `HUMAN`.
fn normalize_actor_kind(raw: &str) -> Result<ActorKind, RejectionReason> {
    match raw {
        "USER" | "HUMAN" => Ok(ActorKind::Human),
        "SYSTEM" => Ok(ActorKind::System),
        "DEVICE" => Ok(ActorKind::Device),
        "AI" => Ok(ActorKind::Ai),
        other => Err(RejectionReason::new(
            ReasonCode::ActorInvalid,
            format!("unrecognised actor type `{other}`"),
            POLICY_NAME,
        )),
    }
}

/// Shorthand for an `INVALID_CONTEXT` rejection attributed to this resolver.
fn invalid_context(message: &str) -> RejectionReason {
    RejectionReason::new(ReasonCode::InvalidContext, message, POLICY_NAME)
}

/// Resolves `headers`/`body` into an `(ActorContext, ResolvedBusinessContext)`
/// pair, authenticating against `auth_provider`.
///
/// # Errors
///
/// Returns a [`RejectionReason`] when:
/// - `X-API-KEY` is missing or does not resolve to a principal
///   (`ACTOR_REQUIRED_MISSING` / `ACTOR_INVALID`);
/// - the principal's raw actor type is not one of `USER`/`SYSTEM`/`DEVICE`/`AI`
///   (`ACTOR_INVALID`);
/// - `X-BUSINESS-ID` is missing or malformed, or a body `business_id`/
///   `branch_id` field disagrees with the corresponding header
///   (`INVALID_CONTEXT`);
/// - the resolved principal is not authorized for the targeted business or
///   branch (`ACTOR_UNAUTHORIZED_BUSINESS` / `ACTOR_UNAUTHORIZED_BRANCH`).
pub fn resolve_context(
    headers: &dyn HeaderLookup,
    body: &dyn BodyLookup,
    auth_provider: &dyn AuthProvider,
) -> Result<(ActorContext, ResolvedBusinessContext), RejectionReason> {
    let api_key = headers.header(API_KEY_HEADER).ok_or_else(|| {
        RejectionReason::new(
            ReasonCode::ActorRequiredMissing,
            "missing X-API-KEY header",
            POLICY_NAME,
        )
    })?;

    let principal = auth_provider
        .resolve_api_key(api_key)
        .map_err(|error| {
            RejectionReason::new(ReasonCode::ActorInvalid, format!("auth provider error: {error}"), POLICY_NAME)
        })?
        .ok_or_else(|| RejectionReason::new(ReasonCode::ActorInvalid, "api key did not resolve", POLICY_NAME))?;

    let actor_kind = normalize_actor_kind(&principal.actor_type)?;
    let actor = ActorContext::from_actor_id(actor_kind, principal.actor_id.clone());

    let business_id_header = headers
        .header(BUSINESS_ID_HEADER)
        .ok_or_else(|| invalid_context("missing X-BUSINESS-ID header"))?;
    let business_id: TenantId = business_id_header
        .parse()
        .map_err(|_| invalid_context("X-BUSINESS-ID header is not a valid identifier"))?;
    if let Some(body_business_id) = body.field("business_id") {
        if body_business_id != business_id_header {
            return Err(invalid_context("body business_id does not match X-BUSINESS-ID header"));
        }
    }

    let branch_id = match headers.header(BRANCH_ID_HEADER) {
        Some(raw) => Some(raw.parse::<BranchId>().map_err(|_| invalid_context("X-BRANCH-ID header is not a valid identifier"))?),
        None => None,
    };
    if let Some(body_branch_id) = body.field("branch_id") {
        let matches = branch_id.is_some_and(|branch_id| branch_id.to_string() == body_branch_id);
        if !matches {
            return Err(invalid_context("body branch_id does not match X-BRANCH-ID header"));
        }
    }

    let context = ResolvedBusinessContext::new(business_id, &principal);

    if !context.authorize_business(&actor) {
        return Err(RejectionReason::new(
            ReasonCode::ActorUnauthorizedBusiness,
            "actor is not authorized for the target business",
            POLICY_NAME,
        ));
    }
    if let Some(branch_id) = branch_id {
        if !context.authorize_branch(&actor, branch_id) {
            return Err(RejectionReason::new(
                ReasonCode::ActorUnauthorizedBranch,
                "actor is not authorized for the target branch",
                POLICY_NAME,
            ));
        }
    }

    Ok((actor, context))
}
