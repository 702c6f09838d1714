// crates/bos-events/src/sink.rs
// ============================================================================
// Module: BOS Persistence Sink
// Description: The narrow contract an event-persistence backend implements,
//              plus an in-memory reference implementation.
// Purpose: Implement §4.3 "Persistence sink": the core never owns storage,
//          only the contract durability must honour.
// Dependencies: bos-core, std::sync
// ============================================================================

//! ## Overview
//! `persist` is the only operation in the emission path permitted to block
//! (§5 "Suspension points"). The in-memory sink here never blocks; it exists
//! so tests and small deployments can exercise the full emission path
//! without a real durable backend. `bos-store-sqlite` provides the durable
//! implementation.

use std::sync::Mutex;

use bos_core::core::command::ScopeRequirement;
use bos_core::core::context::BusinessContext;
use bos_core::core::event::EventEnvelope;
use bos_core::core::identifiers::TenantId;

use crate::registry::EventTypeRegistry;

/// Outcome of a [`PersistenceSink::persist`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistResult {
    /// Whether the event was durably accepted.
    pub accepted: bool,
}

/// Narrow contract an event-persistence backend implements.
///
/// The core tolerates any sink honouring this contract; durability, if any,
/// is entirely the sink's responsibility (§4.3, §7 "Non-goals").
pub trait PersistenceSink: Send + Sync {
    /// Persists `event`, having already confirmed `event.event_type()` is a
    /// member of `registry`.
    ///
    /// `scope_requirement` is carried through so the sink can assert the
    /// defence-in-depth invariant that a `BRANCH_REQUIRED` event always
    /// carries a `branch_id`; sinks that do not care about this may ignore it.
    fn persist(
        &self,
        event: &EventEnvelope,
        context: &dyn BusinessContext,
        registry: &EventTypeRegistry,
        scope_requirement: ScopeRequirement,
    ) -> PersistResult;
}

/// In-memory, append-only [`PersistenceSink`] ordered by append time per tenant.
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    log: Mutex<Vec<EventEnvelope>>,
}

impl InMemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event appended for `tenant_id`, in append order.
    #[must_use]
    pub fn events_for_tenant(&self, tenant_id: TenantId) -> Vec<EventEnvelope> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|event| event.tenant_id() == tenant_id)
            .cloned()
            .collect()
    }

    /// Returns every event ever appended, in append order, across tenants.
    #[must_use]
    pub fn all_events(&self) -> Vec<EventEnvelope> {
        self.log.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

impl PersistenceSink for InMemoryEventSink {
    fn persist(
        &self,
        event: &EventEnvelope,
        _context: &dyn BusinessContext,
        registry: &EventTypeRegistry,
        scope_requirement: ScopeRequirement,
    ) -> PersistResult {
        if !registry.contains(event.event_type()) {
            return PersistResult { accepted: false };
        }
        if matches!(scope_requirement, ScopeRequirement::BranchRequired) && event.branch_id().is_none() {
            return PersistResult { accepted: false };
        }
        self.log.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(event.clone());
        PersistResult { accepted: true }
    }
}
