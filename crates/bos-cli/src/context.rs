// crates/bos-cli/src/context.rs
// ============================================================================
// Module: BOS CLI Business Context
// Description: The `BusinessContext` and permission seeding the CLI supplies
//              on a caller's behalf, since there is no authenticated
//              transport layer resolving one for it.
// Purpose: Let a single `bos submit` invocation stand in for a host that
//          would otherwise resolve tenancy and permission grants from its
//          own session state (§4.6 describes the HTTP-backed equivalent).
// Dependencies: bos-core, bos-providers, std::sync
// ============================================================================

use std::sync::Arc;

use bos_core::core::command::ActorKind;
use bos_core::core::context::ActorContext;
use bos_core::core::context::BusinessContext;
use bos_core::core::context::BusinessLifecycle;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::FeatureFlagProvider;
use bos_core::interfaces::providers::GrantScope;
use bos_core::interfaces::providers::Permission;
use bos_core::interfaces::providers::PermissionProvider;
use bos_core::interfaces::providers::ScopeGrant;
use bos_providers::InMemoryPermissionProvider;

/// The single permission every intent is mapped to for CLI exploration. A
/// real deployment maps each intent to its own named permission; the CLI
/// collapses this to one because it has no role model of its own to express.
const EXPLORE_PERMISSION: &str = "bos.cli.explore";

/// A [`BusinessContext`] that treats exactly one tenant as active, Active,
/// and every branch of it as belonging to the business — standing in for
/// whatever a real transport layer's authenticated session would resolve.
pub struct CliBusinessContext {
    tenant_id: TenantId,
    permission_provider: Arc<InMemoryPermissionProvider>,
}

impl CliBusinessContext {
    /// Builds a context active for `tenant_id`, granting `actor_id` the
    /// exploration permission for every owned intent across `tenant_id` and,
    /// if given, `branch_id`.
    #[must_use]
    pub fn new(tenant_id: TenantId, branch_id: Option<BranchId>, actor_id: &ActorId, owned_intents: &[&str]) -> Self {
        let permission_provider = Arc::new(InMemoryPermissionProvider::new());
        let permission = Permission::new(EXPLORE_PERMISSION);
        for intent in owned_intents {
            permission_provider.map_intent((*intent).to_string(), permission.clone());
        }

        let mut grants = vec![ScopeGrant { permission: permission.clone(), scope: GrantScope::Business(tenant_id) }];
        if let Some(branch_id) = branch_id {
            grants.push(ScopeGrant { permission, scope: GrantScope::Branch(tenant_id, branch_id) });
        }
        permission_provider.set_grants(actor_id.clone(), tenant_id, grants);

        Self { tenant_id, permission_provider }
    }
}

impl BusinessContext for CliBusinessContext {
    fn has_active_context(&self) -> bool {
        true
    }

    fn active_business_id(&self) -> Option<TenantId> {
        Some(self.tenant_id)
    }

    fn lifecycle(&self) -> BusinessLifecycle {
        BusinessLifecycle::Active
    }

    fn is_branch_in_business(&self, _branch_id: BranchId) -> bool {
        true
    }

    fn authorize_business(&self, _actor: &ActorContext) -> bool {
        true
    }

    fn authorize_branch(&self, _actor: &ActorContext, _branch_id: BranchId) -> bool {
        true
    }

    fn get_permission_provider(&self) -> Option<Arc<dyn PermissionProvider>> {
        Some(self.permission_provider.clone())
    }

    fn get_feature_flag_provider(&self) -> Option<Arc<dyn FeatureFlagProvider>> {
        None
    }

    fn has_ai_automation_policy(&self, _actor: &ActorContext) -> bool {
        true
    }
}

/// Returns every command type the CLI's three wired demo engines own.
#[must_use]
pub fn all_owned_intents() -> Vec<&'static str> {
    let mut intents = Vec::new();
    intents.extend(cash_engine::commands::owned_command_types());
    intents.extend(inventory_engine::commands::owned_command_types());
    intents.extend(accounting_engine::commands::owned_command_types());
    intents
}

/// Maps a CLI `--actor-kind` value to the engine's [`ActorKind`].
#[must_use]
pub const fn parse_actor_kind(kind: crate::ActorKindArg) -> ActorKind {
    match kind {
        crate::ActorKindArg::Human => ActorKind::Human,
        crate::ActorKindArg::System => ActorKind::System,
        crate::ActorKindArg::Device => ActorKind::Device,
        crate::ActorKindArg::Ai => ActorKind::Ai,
    }
}
