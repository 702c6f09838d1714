// crates/bos-events/src/lib.rs
// ============================================================================
// Module: BOS Events
// Description: Event type registry, event factory, and the persistence sink
//              contract (§4.3, §2).
// Purpose: Turn an accepted command and a payload into a durable, registry-
//          checked event envelope.
// Dependencies: bos-core
// ============================================================================

#![forbid(unsafe_code)]

pub mod factory;
pub mod registry;
pub mod sink;

pub use factory::build_event;
pub use factory::mechanical_fields;
pub use factory::rejected_event_type;
pub use registry::EventTypeRegistry;
pub use sink::InMemoryEventSink;
pub use sink::PersistResult;
pub use sink::PersistenceSink;
