// crates/bos-providers/src/permission.rs
// ============================================================================
// Module: In-Memory Permission Provider
// Description: Reference implementation of `PermissionProvider`.
// Purpose: Back tests and small deployments with a deny-by-default,
//          explicitly-populated role/grant/mapping store.
// Dependencies: bos-core, std::collections, std::sync
// ============================================================================

//! ## Overview
//! [`InMemoryPermissionProvider`] starts empty: no roles, no grants, no
//! intent mappings. Every lookup on an unpopulated store answers "nothing
//! granted" rather than panicking, matching the permission guard's
//! deny-by-default posture (§4.2 row 8).

use std::collections::BTreeMap;
use std::sync::RwLock;

use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::Permission;
use bos_core::interfaces::providers::PermissionProvider;
use bos_core::interfaces::providers::PermissionProviderError;
use bos_core::interfaces::providers::Role;
use bos_core::interfaces::providers::ScopeGrant;

/// In-memory, test-double [`PermissionProvider`].
#[derive(Debug, Default)]
pub struct InMemoryPermissionProvider {
    roles: RwLock<BTreeMap<(ActorId, TenantId), Vec<Role>>>,
    grants: RwLock<BTreeMap<(ActorId, TenantId), Vec<ScopeGrant>>>,
    intent_mappings: RwLock<BTreeMap<String, Permission>>,
}

impl InMemoryPermissionProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `actor` the given roles within `tenant`, replacing any prior set.
    pub fn set_roles(&self, actor: ActorId, tenant: TenantId, roles: Vec<Role>) {
        self.roles.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert((actor, tenant), roles);
    }

    /// Grants `actor` the given scope grants within `tenant`, replacing any prior set.
    pub fn set_grants(&self, actor: ActorId, tenant: TenantId, grants: Vec<ScopeGrant>) {
        self.grants.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert((actor, tenant), grants);
    }

    /// Maps `intent` to `permission`, replacing any prior mapping.
    pub fn map_intent(&self, intent: impl Into<String>, permission: Permission) {
        self.intent_mappings.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(intent.into(), permission);
    }
}

impl PermissionProvider for InMemoryPermissionProvider {
    fn roles_for_actor(&self, actor: &ActorId, tenant: TenantId) -> Result<Vec<Role>, PermissionProviderError> {
        Ok(self
            .roles
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&(actor.clone(), tenant))
            .cloned()
            .unwrap_or_default())
    }

    fn grants_for_actor(&self, actor: &ActorId, tenant: TenantId) -> Result<Vec<ScopeGrant>, PermissionProviderError> {
        Ok(self
            .grants
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&(actor.clone(), tenant))
            .cloned()
            .unwrap_or_default())
    }

    fn permission_for_intent(&self, intent: &str) -> Result<Option<Permission>, PermissionProviderError> {
        Ok(self
            .intent_mappings
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(intent)
            .cloned())
    }
}
