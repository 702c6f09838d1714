// crates/bos-projection/src/store.rs
// ============================================================================
// Module: BOS Projection Store Contract
// Description: The trait every engine's read model implements, plus a replay
//              helper used to verify determinism.
// Purpose: Implement §4.3 "Projection apply" and §2 "Projection Runtime".
// Dependencies: bos-core
// ============================================================================

//! ## Overview
//! A projection is deterministic, order-sensitive, and total (§4.3):
//! replaying the same ordered event sequence into a fresh store yields
//! byte-identical state; an out-of-order event is the caller's problem, not
//! the projection's; an unrecognised `event_type` is a silent no-op — the
//! projection is never the authority on event-type validity (that is
//! `bos-events::EventTypeRegistry`'s job).

use bos_core::core::command::Payload;

/// The interface the dispatcher's event-emission path requires of an
/// engine's read model.
pub trait ProjectionStore: Send + Sync {
    /// Folds one accepted event into the store's state.
    ///
    /// Implementations MUST treat an unrecognised `event_type` as a no-op
    /// rather than an error (§4.3 "Total").
    fn apply(&self, event_type: &str, payload: &Payload);
}

/// One `(event_type, payload)` pair from an ordered event stream, as consumed
/// by [`replay`].
#[derive(Debug, Clone)]
pub struct ReplayEvent {
    /// The event type to fold.
    pub event_type: String,
    /// The event payload to fold.
    pub payload: Payload,
}

/// Folds an ordered sequence of events into `store`, in order.
///
/// Used by tests to verify §8 property 4 ("projection determinism"): folding
/// the same `events` into two fresh stores must leave them in equal states.
pub fn replay(store: &dyn ProjectionStore, events: &[ReplayEvent]) {
    for event in events {
        store.apply(&event.event_type, &event.payload);
    }
}
