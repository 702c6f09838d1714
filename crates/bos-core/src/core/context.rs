// crates/bos-core/src/core/context.rs
// ============================================================================
// Module: BOS Context Primitives
// Description: BusinessContext, ActorContext, and TenantScope.
// Purpose: Carry the per-request tenancy and actor-authorization snapshot the
//          dispatcher and guard stack consult.
// Dependencies: std::collections, crate::core::identifiers, crate::interfaces
// ============================================================================

//! ## Overview
//! `BusinessContext` is a trait rather than a concrete struct because its
//! lifecycle lookup, branch membership check, and actor-authorization hooks
//! are host-supplied — a transport layer closes these over the authenticated
//! principal's allowed sets (see `bos-http`'s context resolver). Hook absence
//! is permissive by design (§4.2): a context that does not implement an
//! authorization hook is treated as not restricting that dimension.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::command::ActorKind;
use crate::core::identifiers::ActorId;
use crate::core::identifiers::BranchId;
use crate::core::identifiers::TenantId;
use crate::interfaces::providers::ComplianceProvider;
use crate::interfaces::providers::DocumentProvider;
use crate::interfaces::providers::FeatureFlagProvider;
use crate::interfaces::providers::PermissionProvider;

/// Business lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessLifecycle {
    /// The business may accept writes.
    Active,
    /// The business is temporarily suspended; writes are rejected.
    Suspended,
    /// The business is permanently closed; writes are rejected.
    Closed,
    /// The business is under legal hold; writes are rejected.
    LegalHold,
}

/// Per-request tenancy snapshot the dispatcher validates against.
///
/// Implementors answer the context-validation questions in §4.1 step 2 and
/// late-bind the governance providers consulted by the guard stack (§4.2).
pub trait BusinessContext: Send + Sync {
    /// Returns whether any active business context is present at all.
    fn has_active_context(&self) -> bool;

    /// Returns the active tenant, if any.
    fn active_business_id(&self) -> Option<TenantId>;

    /// Returns the business lifecycle state.
    fn lifecycle(&self) -> BusinessLifecycle;

    /// Returns whether `branch_id` belongs to the active business.
    fn is_branch_in_business(&self, branch_id: BranchId) -> bool;

    /// Authorizes the actor against the business as a whole.
    ///
    /// Absence of a restricting implementation is permissive: the default
    /// returns `true`.
    fn authorize_business(&self, _actor: &ActorContext) -> bool {
        true
    }

    /// Authorizes the actor against a specific branch.
    ///
    /// Absence of a restricting implementation is permissive: the default
    /// returns `true`.
    fn authorize_branch(&self, _actor: &ActorContext, _branch_id: BranchId) -> bool {
        true
    }

    /// Returns the permission provider late-bound to this context, if any.
    fn get_permission_provider(&self) -> Option<Arc<dyn PermissionProvider>> {
        None
    }

    /// Returns the feature-flag provider late-bound to this context, if any.
    fn get_feature_flag_provider(&self) -> Option<Arc<dyn FeatureFlagProvider>> {
        None
    }

    /// Returns the compliance provider late-bound to this context, if any.
    fn get_compliance_provider(&self) -> Option<Arc<dyn ComplianceProvider>> {
        None
    }

    /// Returns the document-template provider late-bound to this context, if any.
    fn get_document_provider(&self) -> Option<Arc<dyn DocumentProvider>> {
        None
    }

    /// Returns whether an explicit automation policy grants `actor` autonomous
    /// command execution (§4.5 "AI guardrail" `EXECUTE_COMMAND`).
    ///
    /// Absence of a restricting implementation is conservative: the default
    /// returns `false` — autonomous execution is never granted by default.
    fn has_ai_automation_policy(&self, _actor: &ActorContext) -> bool {
        false
    }
}

/// Actor kind and identifier issuing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    kind: ActorKind,
    actor_id: ActorId,
}

impl ActorContext {
    /// Constructs an actor context from a raw actor id, rejecting empty ids.
    ///
    /// # Errors
    ///
    /// Returns [`ActorContextError`] when `actor_id` is empty or whitespace.
    pub fn new(kind: ActorKind, actor_id: impl Into<String>) -> Result<Self, ActorContextError> {
        let actor_id = ActorId::new(actor_id).map_err(|_| ActorContextError::EmptyActorId)?;
        Ok(Self { kind, actor_id })
    }

    /// Constructs an actor context from an already-validated [`ActorId`].
    #[must_use]
    pub const fn from_actor_id(kind: ActorKind, actor_id: ActorId) -> Self {
        Self { kind, actor_id }
    }

    /// Returns the actor kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Returns the actor identifier.
    #[must_use]
    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }
}

/// Errors constructing an [`ActorContext`] from raw parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActorContextError {
    /// The raw actor identifier was empty.
    #[error("actor context requires a non-empty actor id")]
    EmptyActorId,
}

/// Per-tenant branch allowance: either every branch, or a concrete set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchAllowance {
    /// All branches of the tenant are allowed.
    All,
    /// Only the listed branches are allowed.
    Concrete(BTreeSet<BranchId>),
}

impl BranchAllowance {
    /// Returns whether `branch_id` is allowed.
    #[must_use]
    pub fn allows(&self, branch_id: BranchId) -> bool {
        match self {
            Self::All => true,
            Self::Concrete(set) => set.contains(&branch_id),
        }
    }
}

/// An actor's authorization snapshot: which tenants, and within each tenant
/// which branches, the actor may operate against.
#[derive(Debug, Clone, Default)]
pub struct TenantScope {
    tenants: BTreeSet<TenantId>,
    branches_by_tenant: BTreeMap<TenantId, BranchAllowance>,
}

impl TenantScope {
    /// Creates an empty scope (authorizes nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants the actor access to `tenant_id` with the given branch allowance.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: TenantId, branches: BranchAllowance) -> Self {
        self.tenants.insert(tenant_id);
        self.branches_by_tenant.insert(tenant_id, branches);
        self
    }

    /// Returns whether the scope authorizes `tenant_id`.
    #[must_use]
    pub fn authorizes_tenant(&self, tenant_id: TenantId) -> bool {
        self.tenants.contains(&tenant_id)
    }

    /// Returns whether the scope authorizes `branch_id` within `tenant_id`.
    ///
    /// Returns `false` if the tenant itself is not authorized.
    #[must_use]
    pub fn authorizes_branch(&self, tenant_id: TenantId, branch_id: BranchId) -> bool {
        self.branches_by_tenant
            .get(&tenant_id)
            .is_some_and(|allowance| allowance.allows(branch_id))
    }
}

/// Inert [`BusinessContext`] carrying no active tenant, every provider
/// hook `None`, and every authorization hook at its permissive default.
///
/// Engine `CommandHandler` implementations hold no host-supplied context
/// across the `persist`/`apply` step of §4.3 (only the dispatcher's guard
/// stack receives one, request-scoped from the caller) but the
/// [`crate::interfaces::providers`] persistence contract still takes a
/// `&dyn BusinessContext` parameter; both reference sinks (in-memory and
/// SQLite) ignore it entirely, so this placeholder satisfies the signature
/// without engines each declaring their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBusinessContext;

impl BusinessContext for NullBusinessContext {
    fn has_active_context(&self) -> bool {
        false
    }

    fn active_business_id(&self) -> Option<TenantId> {
        None
    }

    fn lifecycle(&self) -> BusinessLifecycle {
        BusinessLifecycle::Active
    }

    fn is_branch_in_business(&self, _branch_id: BranchId) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_scope_denies_unlisted_tenant() {
        let scope = TenantScope::new();
        let tenant = TenantId::new();
        assert!(!scope.authorizes_tenant(tenant));
    }

    #[test]
    fn tenant_scope_concrete_branch_allowance_denies_unlisted_branch() {
        let tenant = TenantId::new();
        let allowed_branch = BranchId::new();
        let other_branch = BranchId::new();
        let scope = TenantScope::new().with_tenant(
            tenant,
            BranchAllowance::Concrete(BTreeSet::from([allowed_branch])),
        );
        assert!(scope.authorizes_branch(tenant, allowed_branch));
        assert!(!scope.authorizes_branch(tenant, other_branch));
    }

    #[test]
    fn tenant_scope_all_branches_allows_any_branch_of_the_tenant() {
        let tenant = TenantId::new();
        let scope = TenantScope::new().with_tenant(tenant, BranchAllowance::All);
        assert!(scope.authorizes_branch(tenant, BranchId::new()));
    }
}
