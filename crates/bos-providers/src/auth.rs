// crates/bos-providers/src/auth.rs
// ============================================================================
// Module: In-Memory Auth Provider
// Description: Reference implementation of `AuthProvider`.
// Purpose: Resolve opaque API keys to principals for tests and small
//          deployments without a real identity backend.
// Dependencies: bos-core, std::collections, std::sync
// ============================================================================

use std::collections::BTreeMap;
use std::sync::RwLock;

use bos_core::interfaces::providers::AuthPrincipal;
use bos_core::interfaces::providers::AuthProvider;
use bos_core::interfaces::providers::AuthProviderError;

/// In-memory, test-double [`AuthProvider`].
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    principals: RwLock<BTreeMap<String, AuthPrincipal>>,
}

impl InMemoryAuthProvider {
    /// Creates a provider with no registered keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` as resolving to `principal`, replacing any prior
    /// registration for the same key.
    pub fn register(&self, key: impl Into<String>, principal: AuthPrincipal) {
        self.principals
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.into(), principal);
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn resolve_api_key(&self, key: &str) -> Result<Option<AuthPrincipal>, AuthProviderError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bos_core::core::identifiers::ActorId;
    use std::collections::BTreeMap as Map;
    use std::collections::BTreeSet;

    #[test]
    fn unknown_key_resolves_to_none() {
        let provider = InMemoryAuthProvider::new();
        assert!(provider.resolve_api_key("no-such-key").expect("ok").is_none());
    }

    #[test]
    fn registered_key_resolves_to_principal() {
        let provider = InMemoryAuthProvider::new();
        let principal = AuthPrincipal {
            actor_id: ActorId::new("user-1").expect("valid"),
            actor_type: "USER".to_string(),
            allowed_business_ids: BTreeSet::new(),
            allowed_branch_ids_by_business: Map::new(),
        };
        provider.register("sk-test-1", principal.clone());
        assert_eq!(provider.resolve_api_key("sk-test-1").expect("ok"), Some(principal));
    }
}
