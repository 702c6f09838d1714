// crates/bos-core/src/core/audit.rs
// ============================================================================
// Module: BOS Audit Entry
// Description: Immutable audit log record created at every command resolution.
// Purpose: Record every accept, reject, and error for compliance review.
// Dependencies: time, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! An [`AuditEntry`] is created at the point a command resolves — accepted,
//! rejected, or errored — and never mutated or deleted afterward (§3).

use time::OffsetDateTime;

use crate::core::command::ActorKind;
use crate::core::command::Payload;
use crate::core::identifiers::AuditEntryId;
use crate::core::identifiers::BranchId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::TenantId;

/// The terminal status an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditStatus {
    /// The command was accepted and its event emitted.
    Executed,
    /// The command was rejected by a guard.
    Rejected,
    /// The command resolution raised a programmer error.
    Error,
}

/// Immutable audit log record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    entry_id: AuditEntryId,
    event_id: Option<EventId>,
    actor_id: String,
    actor_type: ActorKind,
    action: String,
    resource_type: String,
    resource_id: String,
    business_id: TenantId,
    branch_id: Option<BranchId>,
    status: AuditStatus,
    occurred_at: OffsetDateTime,
    metadata: Payload,
}

/// Parameters accepted by [`AuditEntry::new`].
#[derive(Debug, Clone)]
pub struct AuditEntrySpec {
    /// The event id this entry corresponds to, if the command was accepted.
    pub event_id: Option<EventId>,
    /// The actor identifier.
    pub actor_id: String,
    /// The actor kind.
    pub actor_type: ActorKind,
    /// The command intent, used verbatim as the audited action.
    pub action: String,
    /// The kind of resource the action targeted (e.g. the source engine).
    pub resource_type: String,
    /// The identifier of the resource the action targeted.
    pub resource_id: String,
    /// The target business.
    pub business_id: TenantId,
    /// The target branch, if any.
    pub branch_id: Option<BranchId>,
    /// The terminal status.
    pub status: AuditStatus,
    /// When the entry was created.
    pub occurred_at: OffsetDateTime,
    /// Additional structured metadata (e.g. rejection code and policy name).
    pub metadata: Payload,
}

impl AuditEntry {
    /// Creates an audit entry. Never mutated or deleted after construction.
    #[must_use]
    pub fn new(spec: AuditEntrySpec) -> Self {
        Self {
            entry_id: AuditEntryId::new(),
            event_id: spec.event_id,
            actor_id: spec.actor_id,
            actor_type: spec.actor_type,
            action: spec.action,
            resource_type: spec.resource_type,
            resource_id: spec.resource_id,
            business_id: spec.business_id,
            branch_id: spec.branch_id,
            status: spec.status,
            occurred_at: spec.occurred_at,
            metadata: spec.metadata,
        }
    }

    /// Returns the audit entry identifier.
    #[must_use]
    pub const fn entry_id(&self) -> AuditEntryId {
        self.entry_id
    }

    /// Returns the associated event id, if any.
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        self.event_id
    }

    /// Returns the actor identifier.
    #[must_use]
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Returns the actor kind.
    #[must_use]
    pub const fn actor_type(&self) -> ActorKind {
        self.actor_type
    }

    /// Returns the audited action (the command intent).
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Returns the target business.
    #[must_use]
    pub const fn business_id(&self) -> TenantId {
        self.business_id
    }

    /// Returns the target branch, if any.
    #[must_use]
    pub const fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    /// Returns the terminal status.
    #[must_use]
    pub const fn status(&self) -> AuditStatus {
        self.status
    }

    /// Returns when the entry was created.
    #[must_use]
    pub const fn occurred_at(&self) -> OffsetDateTime {
        self.occurred_at
    }

    /// Returns additional structured metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Payload {
        &self.metadata
    }
}
