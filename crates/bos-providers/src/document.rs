// crates/bos-providers/src/document.rs
// ============================================================================
// Module: In-Memory Document Template Provider
// Description: Reference implementation of `DocumentProvider`.
// Purpose: Let tests and small deployments seed template records; the
//          document-validation guard owns canonicalisation precedence.
// Dependencies: bos-core, std::collections, std::sync
// ============================================================================

use std::collections::BTreeMap;
use std::sync::RwLock;

use bos_core::core::identifiers::TenantId;
use bos_core::interfaces::providers::DocumentProvider;
use bos_core::interfaces::providers::DocumentProviderError;
use bos_core::interfaces::providers::DocumentTemplate;

/// In-memory, test-double [`DocumentProvider`].
#[derive(Debug, Default)]
pub struct InMemoryDocumentProvider {
    templates: RwLock<BTreeMap<TenantId, Vec<DocumentTemplate>>>,
}

impl InMemoryDocumentProvider {
    /// Creates a provider with no templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a template record for its tenant.
    pub fn push_template(&self, template: DocumentTemplate) {
        self.templates
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(template.tenant_id)
            .or_default()
            .push(template);
    }
}

impl DocumentProvider for InMemoryDocumentProvider {
    fn templates_for_tenant(&self, tenant: TenantId) -> Result<Vec<DocumentTemplate>, DocumentProviderError> {
        Ok(self
            .templates
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
    use bos_core::interfaces::providers::TemplateStatus;
    use std::collections::BTreeSet;
    use time::macros::datetime;

    #[test]
    fn returns_templates_seeded_for_tenant() {
        let provider = InMemoryDocumentProvider::new();
        let tenant = TenantId::new();
        provider.push_template(DocumentTemplate {
            template_id: "tpl-1".to_string(),
            tenant_id: tenant,
            branch_id: None,
            doc_type: "invoice".to_string(),
            version: 1,
            status: TemplateStatus::Active,
            created_at: datetime!(2026-01-01 00:00:00 UTC),
            required_fields: BTreeSet::from(["customer_name".to_string()]),
        });
        assert_eq!(provider.templates_for_tenant(tenant).expect("ok").len(), 1);
        assert!(provider.templates_for_tenant(TenantId::new()).expect("ok").is_empty());
    }
}
