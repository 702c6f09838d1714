// crates/bos-core/src/core/event.rs
// ============================================================================
// Module: BOS Event Envelope
// Description: The immutable, append-only record emitted after an accepted command.
// Purpose: Carry everything a persistence sink and projection need, nothing more.
// Dependencies: time, crate::core
// ============================================================================

//! ## Overview
//! An [`EventEnvelope`] never inspects business content; it is built
//! mechanically from a command, an event type, and a payload (§4.3 "Event
//! factory"). Events are never modified after construction.

use time::OffsetDateTime;

use crate::core::command::ActorKind;
use crate::core::command::Payload;
use crate::core::identifiers::BranchId;
use crate::core::identifiers::CommandId;
use crate::core::identifiers::CorrelationId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::TenantId;

/// Immutable record emitted after an accepted command.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    event_id: EventId,
    event_type: String,
    payload: Payload,
    tenant_id: TenantId,
    branch_id: Option<BranchId>,
    correlation_id: CorrelationId,
    command_id: CommandId,
    actor_id: String,
    actor_kind: ActorKind,
    occurred_at: OffsetDateTime,
}

/// Parameters accepted by [`EventEnvelope::new`].
#[derive(Debug, Clone)]
pub struct EventEnvelopeSpec {
    /// Namespaced event type with a `.vN` suffix, e.g. `cash.session.opened.v1`.
    pub event_type: String,
    /// Structured event payload.
    pub payload: Payload,
    /// Target tenant.
    pub tenant_id: TenantId,
    /// Target branch, if any.
    pub branch_id: Option<BranchId>,
    /// The originating command's correlation id.
    pub correlation_id: CorrelationId,
    /// The originating command's id.
    pub command_id: CommandId,
    /// The originating command's actor id.
    pub actor_id: String,
    /// The originating command's actor kind.
    pub actor_kind: ActorKind,
    /// Event timestamp, supplied by an injected clock.
    pub occurred_at: OffsetDateTime,
}

impl EventEnvelope {
    /// Builds an event envelope. Never inspects the payload's business content.
    #[must_use]
    pub fn new(spec: EventEnvelopeSpec) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: spec.event_type,
            payload: spec.payload,
            tenant_id: spec.tenant_id,
            branch_id: spec.branch_id,
            correlation_id: spec.correlation_id,
            command_id: spec.command_id,
            actor_id: spec.actor_id,
            actor_kind: spec.actor_kind,
            occurred_at: spec.occurred_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the event type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the event payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the target tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the target branch, if any.
    #[must_use]
    pub const fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    /// Returns the originating command's correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the originating command's id.
    #[must_use]
    pub const fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// Returns the originating command's actor id.
    #[must_use]
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Returns the originating command's actor kind.
    #[must_use]
    pub const fn actor_kind(&self) -> ActorKind {
        self.actor_kind
    }

    /// Returns when the event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> OffsetDateTime {
        self.occurred_at
    }
}
