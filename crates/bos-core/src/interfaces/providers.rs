// crates/bos-core/src/interfaces/providers.rs
// ============================================================================
// Module: Governance Provider Traits
// Description: Permission, feature-flag, compliance, document-template, and
//              auth provider contracts.
// Purpose: Decouple the guard stack from any concrete source of governance data.
// Dependencies: crate::core, thiserror, time
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use time::OffsetDateTime;

use crate::core::command::Command;
use crate::core::context::BusinessContext;
use crate::core::identifiers::ActorId;
use crate::core::identifiers::BranchId;
use crate::core::identifiers::TenantId;
use crate::core::rejection::ReasonCode;

// ============================================================================
// SECTION: Shared Value Types
// ============================================================================

/// Opaque role name granted to an actor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Role(String);

impl Role {
    /// Wraps a raw role name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque permission name an intent maps to.
///
/// The permission catalogue is intentionally open (engines mint their own
/// permission names); only the provider contract that resolves them is fixed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permission(String);

impl Permission {
    /// Wraps a raw permission name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The scope over which a [`ScopeGrant`] authorizes a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantScope {
    /// Authorizes the permission for the whole business.
    Business(TenantId),
    /// Authorizes the permission for one specific branch.
    Branch(TenantId, BranchId),
}

/// A single permission grant held by an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeGrant {
    /// The permission this grant authorizes.
    pub permission: Permission,
    /// The scope over which it is authorized.
    pub scope: GrantScope,
}

/// Feature flag enablement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStatus {
    /// The flag is enabled at this scope.
    Enabled,
    /// The flag is disabled at this scope.
    Disabled,
}

/// One feature-flag state record returned by [`FeatureFlagProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlagState {
    /// The flag key, e.g. `ENABLE_CASH_ENGINE`.
    pub flag_key: String,
    /// The tenant this record applies to.
    pub tenant_id: TenantId,
    /// The branch this record applies to, or `None` for a business-wide record.
    pub branch_id: Option<BranchId>,
    /// Whether the flag is enabled at this scope.
    pub status: FlagStatus,
    /// When this record was created, used as a canonicalisation tiebreak.
    pub created_at: OffsetDateTime,
}

/// Document template lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStatus {
    /// The template is the active one for its `(tenant, branch, doc_type)`.
    Active,
    /// The template exists but is not currently active.
    Inactive,
}

/// One document template record returned by [`DocumentProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    /// Stable template identifier, used as the final canonicalisation tiebreak.
    pub template_id: String,
    /// The tenant this template applies to.
    pub tenant_id: TenantId,
    /// The branch this template applies to, or `None` for business-wide.
    pub branch_id: Option<BranchId>,
    /// The document type this template renders, e.g. `invoice`.
    pub doc_type: String,
    /// Monotonically increasing template version.
    pub version: u32,
    /// Lifecycle status.
    pub status: TemplateStatus,
    /// Creation time, used as a canonicalisation tiebreak.
    pub created_at: OffsetDateTime,
    /// Layout field names the command payload must supply.
    pub required_fields: BTreeSet<String>,
}

/// A single compliance violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Human-readable violation message.
    pub message: String,
}

/// The result of a compliance evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceResult {
    /// Whether the command is allowed.
    pub allowed: bool,
    /// The rejection code to surface when `allowed` is `false`, if the
    /// provider supplied one; the guard falls back to `COMPLIANCE_VIOLATION`.
    pub rejection_code: Option<ReasonCode>,
    /// The violations found, in provider-reported order.
    pub violations: Vec<Violation>,
}

/// An authenticated principal resolved from an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPrincipal {
    /// The actor identifier.
    pub actor_id: ActorId,
    /// The raw actor type string as the provider reported it (e.g. `USER`,
    /// `SYSTEM`, `DEVICE`, `AI`), prior to HTTP-layer normalisation.
    pub actor_type: String,
    /// Business ids the principal may act within.
    pub allowed_business_ids: BTreeSet<TenantId>,
    /// Branch ids the principal may act within, keyed by business id.
    pub allowed_branch_ids_by_business: BTreeMap<TenantId, BTreeSet<BranchId>>,
}

// ============================================================================
// SECTION: Permission Provider
// ============================================================================

/// Errors from a [`PermissionProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PermissionProviderError {
    /// The provider reported an error.
    #[error("permission provider error: {0}")]
    Provider(String),
}

/// Read-only source of role/grant/permission-mapping data.
pub trait PermissionProvider: Send + Sync {
    /// Returns the roles held by `actor` within `tenant`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionProviderError`] when role data cannot be fetched.
    fn roles_for_actor(&self, actor: &ActorId, tenant: TenantId) -> Result<Vec<Role>, PermissionProviderError>;

    /// Returns the scope grants held by `actor` within `tenant`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionProviderError`] when grant data cannot be fetched.
    fn grants_for_actor(&self, actor: &ActorId, tenant: TenantId) -> Result<Vec<ScopeGrant>, PermissionProviderError>;

    /// Resolves the permission required by `intent`, if mapped.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionProviderError`] when the mapping cannot be fetched.
    fn permission_for_intent(&self, intent: &str) -> Result<Option<Permission>, PermissionProviderError>;
}

// ============================================================================
// SECTION: Feature Flag Provider
// ============================================================================

/// Errors from a [`FeatureFlagProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeatureFlagProviderError {
    /// The provider reported an error.
    #[error("feature flag provider error: {0}")]
    Provider(String),
}

/// Read-only source of feature-flag state.
pub trait FeatureFlagProvider: Send + Sync {
    /// Returns every flag record for `tenant` (all flags, all branches).
    ///
    /// # Errors
    ///
    /// Returns [`FeatureFlagProviderError`] when flag data cannot be fetched.
    fn flags_for_tenant(&self, tenant: TenantId) -> Result<Vec<FeatureFlagState>, FeatureFlagProviderError>;
}

// ============================================================================
// SECTION: Document Provider
// ============================================================================

/// Errors from a [`DocumentProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentProviderError {
    /// The provider reported an error.
    #[error("document provider error: {0}")]
    Provider(String),
}

/// Read-only source of document template records.
pub trait DocumentProvider: Send + Sync {
    /// Returns every template record for `tenant`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentProviderError`] when template data cannot be fetched.
    fn templates_for_tenant(&self, tenant: TenantId) -> Result<Vec<DocumentTemplate>, DocumentProviderError>;
}

// ============================================================================
// SECTION: Compliance Provider
// ============================================================================

/// Errors from a [`ComplianceProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComplianceProviderError {
    /// The provider reported an error.
    #[error("compliance provider error: {0}")]
    Provider(String),
}

/// Read-only compliance rule evaluator.
pub trait ComplianceProvider: Send + Sync {
    /// Evaluates `command` against compliance rules for its tenant.
    ///
    /// # Errors
    ///
    /// Returns [`ComplianceProviderError`] when evaluation cannot complete.
    fn evaluate(
        &self,
        command: &Command,
        context: &dyn BusinessContext,
    ) -> Result<ComplianceResult, ComplianceProviderError>;
}

// ============================================================================
// SECTION: Auth Provider
// ============================================================================

/// Errors from an [`AuthProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthProviderError {
    /// The provider reported an error.
    #[error("auth provider error: {0}")]
    Provider(String),
}

/// Resolves an opaque API key to an authenticated principal.
pub trait AuthProvider: Send + Sync {
    /// Resolves `key` to a principal, or `None` if the key is unrecognised.
    ///
    /// # Errors
    ///
    /// Returns [`AuthProviderError`] when resolution cannot complete (this is
    /// distinct from an unrecognised key, which returns `Ok(None)`).
    fn resolve_api_key(&self, key: &str) -> Result<Option<AuthPrincipal>, AuthProviderError>;
}
