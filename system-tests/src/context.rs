// system-tests/src/context.rs
// ============================================================================
// Module: Configurable Test BusinessContext
// Description: A `BusinessContext` test double whose every dimension —
//              lifecycle, branch membership, provider wiring, actor
//              authorization, AI automation policy — is set explicitly by
//              the test constructing it.
// Purpose: Exercise every guard-stack row (§4.2) against deliberately chosen
//          context states, generalizing `bos_cli::context::CliBusinessContext`
//          (which hardwires a single always-permissive tenant) to a context a
//          test can misconfigure on purpose.
// Dependencies: bos-core, bos-providers, std::collections, std::sync
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use bos_core::core::context::ActorContext;
use bos_core::core::context::BusinessContext;
use bos_core::core::context::BusinessLifecycle;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::ComplianceProvider;
use bos_core::interfaces::providers::DocumentProvider;
use bos_core::interfaces::providers::FeatureFlagProvider;
use bos_core::interfaces::providers::GrantScope;
use bos_core::interfaces::providers::Permission;
use bos_core::interfaces::providers::PermissionProvider;
use bos_core::interfaces::providers::ScopeGrant;
use bos_providers::InMemoryPermissionProvider;

/// Grants `actor_id` a single permission for every intent in `intents`,
/// scoped to `tenant_id` and, if given, `branch_id` — the common
/// "let this actor through the permission guard" setup every scenario test
/// that reaches guard row 8 needs, grounded in
/// `bos_cli::context::CliBusinessContext::new`'s identical single-permission
/// collapse.
#[must_use]
pub fn permissive_permission_provider(
    actor_id: &ActorId,
    tenant_id: TenantId,
    branch_id: Option<BranchId>,
    intents: &[&str],
) -> Arc<InMemoryPermissionProvider> {
    let provider = Arc::new(InMemoryPermissionProvider::new());
    let permission = Permission::new("system-tests.explore");
    for intent in intents {
        provider.map_intent((*intent).to_string(), permission.clone());
    }
    let mut grants = vec![ScopeGrant { permission: permission.clone(), scope: GrantScope::Business(tenant_id) }];
    if let Some(branch_id) = branch_id {
        grants.push(ScopeGrant { permission, scope: GrantScope::Branch(tenant_id, branch_id) });
    }
    provider.set_grants(actor_id.clone(), tenant_id, grants);
    provider
}

/// A [`BusinessContext`] whose every answer is supplied by the test that
/// built it, rather than hardcoded permissive defaults.
pub struct TestContext {
    active: bool,
    tenant_id: Option<TenantId>,
    lifecycle: BusinessLifecycle,
    business_branches: BTreeSet<BranchId>,
    authorize_business: bool,
    authorize_branch: bool,
    ai_automation_policy: bool,
    permission_provider: Option<Arc<dyn PermissionProvider>>,
    feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
    compliance_provider: Option<Arc<dyn ComplianceProvider>>,
    document_provider: Option<Arc<dyn DocumentProvider>>,
}

impl TestContext {
    /// Builds a context active for `tenant_id`, `ACTIVE` lifecycle, every
    /// authorization hook permissive, and no providers wired — the baseline
    /// a test narrows from rather than widens.
    #[must_use]
    pub fn active(tenant_id: TenantId) -> Self {
        Self {
            active: true,
            tenant_id: Some(tenant_id),
            lifecycle: BusinessLifecycle::Active,
            business_branches: BTreeSet::new(),
            authorize_business: true,
            authorize_branch: true,
            ai_automation_policy: false,
            permission_provider: None,
            feature_flag_provider: None,
            compliance_provider: None,
            document_provider: None,
        }
    }

    /// Sets the business lifecycle state.
    #[must_use]
    pub const fn with_lifecycle(mut self, lifecycle: BusinessLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Registers `branch_id` as belonging to the active business.
    #[must_use]
    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.business_branches.insert(branch_id);
        self
    }

    /// Wires a permission provider for the permission guard (§4.2 row 8).
    #[must_use]
    pub fn with_permission_provider(mut self, provider: Arc<dyn PermissionProvider>) -> Self {
        self.permission_provider = Some(provider);
        self
    }

    /// Wires a feature-flag provider for the feature-flag, compliance-gate,
    /// and document-gate guards (§4.2 rows 6, 9, 10).
    #[must_use]
    pub fn with_feature_flag_provider(mut self, provider: Arc<dyn FeatureFlagProvider>) -> Self {
        self.feature_flag_provider = Some(provider);
        self
    }

    /// Wires a compliance provider for the compliance guard (§4.2 row 9).
    #[must_use]
    pub fn with_compliance_provider(mut self, provider: Arc<dyn ComplianceProvider>) -> Self {
        self.compliance_provider = Some(provider);
        self
    }

    /// Wires a document-template provider for the document guard (§4.2 row 10).
    #[must_use]
    pub fn with_document_provider(mut self, provider: Arc<dyn DocumentProvider>) -> Self {
        self.document_provider = Some(provider);
        self
    }

    /// Sets whether the actor-scope guard authorizes the business as a whole
    /// (§4.2 row 7).
    #[must_use]
    pub const fn with_business_authorized(mut self, authorized: bool) -> Self {
        self.authorize_business = authorized;
        self
    }

    /// Sets whether the actor-scope guard authorizes the command's branch
    /// (§4.2 row 7).
    #[must_use]
    pub const fn with_branch_authorized(mut self, authorized: bool) -> Self {
        self.authorize_branch = authorized;
        self
    }

    /// Sets whether an automation policy grants AI actors autonomous
    /// `EXECUTE_COMMAND` (§4.5 "AI guardrail").
    #[must_use]
    pub const fn with_ai_automation_policy(mut self, granted: bool) -> Self {
        self.ai_automation_policy = granted;
        self
    }

    /// Builds a context reporting no active business at all — exercises
    /// `NO_ACTIVE_CONTEXT` at the scope guard.
    #[must_use]
    pub fn inactive() -> Self {
        let mut context = Self::active(TenantId::new());
        context.active = false;
        context.tenant_id = None;
        context
    }
}

impl BusinessContext for TestContext {
    fn has_active_context(&self) -> bool {
        self.active
    }

    fn active_business_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    fn lifecycle(&self) -> BusinessLifecycle {
        self.lifecycle
    }

    fn is_branch_in_business(&self, branch_id: BranchId) -> bool {
        self.business_branches.contains(&branch_id)
    }

    fn authorize_business(&self, _actor: &ActorContext) -> bool {
        self.authorize_business
    }

    fn authorize_branch(&self, _actor: &ActorContext, _branch_id: BranchId) -> bool {
        self.authorize_branch
    }

    fn get_permission_provider(&self) -> Option<Arc<dyn PermissionProvider>> {
        self.permission_provider.clone()
    }

    fn get_feature_flag_provider(&self) -> Option<Arc<dyn FeatureFlagProvider>> {
        self.feature_flag_provider.clone()
    }

    fn get_compliance_provider(&self) -> Option<Arc<dyn ComplianceProvider>> {
        self.compliance_provider.clone()
    }

    fn get_document_provider(&self) -> Option<Arc<dyn DocumentProvider>> {
        self.document_provider.clone()
    }

    fn has_ai_automation_policy(&self, _actor: &ActorContext) -> bool {
        self.ai_automation_policy
    }
}
