// crates/bos-providers/src/feature_flag.rs
// ============================================================================
// Module: In-Memory Feature Flag Provider
// Description: Reference implementation of `FeatureFlagProvider`.
// Purpose: Let tests and small deployments seed raw (possibly duplicate)
//          flag records; canonicalisation is the feature-flag guard's job.
// Dependencies: bos-core, std::collections, std::sync
// ============================================================================

//! ## Overview
//! This store intentionally allows more than one record for the same
//! `(flag_key, branch_id)` pair — duplicate-resolution policy (DISABLED
//! dominates ENABLED, then newest `created_at`, then lexicographic tiebreak)
//! belongs to the guard that consumes [`flags_for_tenant`](FeatureFlagProvider::flags_for_tenant),
//! not to the provider (§6 "Provider contracts").

use std::collections::BTreeMap;
use std::sync::RwLock;

use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::FeatureFlagProvider;
use bos_core::interfaces::providers::FeatureFlagProviderError;
use bos_core::interfaces::providers::FeatureFlagState;

/// In-memory, test-double [`FeatureFlagProvider`].
#[derive(Debug, Default)]
pub struct InMemoryFeatureFlagProvider {
    records: RwLock<BTreeMap<TenantId, Vec<FeatureFlagState>>>,
}

impl InMemoryFeatureFlagProvider {
    /// Creates a provider with no flag records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a flag record for its tenant. Does not deduplicate.
    pub fn push_record(&self, record: FeatureFlagState) {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(record.tenant_id)
            .or_default()
            .push(record);
    }
}

impl FeatureFlagProvider for InMemoryFeatureFlagProvider {
    fn flags_for_tenant(&self, tenant: TenantId) -> Result<Vec<FeatureFlagState>, FeatureFlagProviderError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&tenant)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bos_core::interfaces::providers::FlagStatus;
    use time::macros::datetime;

    #[test]
    fn returns_every_record_including_duplicates() {
        let provider = InMemoryFeatureFlagProvider::new();
        let tenant = TenantId::new();
        provider.push_record(FeatureFlagState {
            flag_key: "ENABLE_CASH_ENGINE".to_string(),
            tenant_id: tenant,
            branch_id: None,
            status: FlagStatus::Enabled,
            created_at: datetime!(2026-01-01 00:00:00 UTC),
        });
        provider.push_record(FeatureFlagState {
            flag_key: "ENABLE_CASH_ENGINE".to_string(),
            tenant_id: tenant,
            branch_id: None,
            status: FlagStatus::Disabled,
            created_at: datetime!(2026-01-02 00:00:00 UTC),
        });
        assert_eq!(provider.flags_for_tenant(tenant).expect("ok").len(), 2);
    }

    #[test]
    fn unknown_tenant_returns_empty() {
        let provider = InMemoryFeatureFlagProvider::new();
        assert!(provider.flags_for_tenant(TenantId::new()).expect("ok").is_empty());
    }
}
