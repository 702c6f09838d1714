// crates/bos-core/src/lib.rs
// ============================================================================
// Module: BOS Core
// Description: Kernel value types for the command-to-event governance pipeline.
// Purpose: Provide the identifiers, command model, rejection model, context
//          primitives, and provider interfaces every other BOS crate builds on.
// Dependencies: serde, serde_json, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! `bos-core` has no dependency on any other BOS crate and no dependency on
//! engine-specific business rules. It defines the vocabulary the rest of the
//! workspace shares: identifiers, the immutable [`core::command::Command`]
//! value, the closed [`core::rejection::RejectionReason`] enumeration, context
//! primitives, and the provider traits consumed by the policy guard stack.
//!
//! Security posture: values constructed here are the trust boundary for
//! everything downstream — constructors reject malformed input rather than
//! normalising it silently.

#![forbid(unsafe_code)]

pub mod core;
pub mod interfaces;

pub use core::audit::AuditEntry;
pub use core::audit::AuditStatus;
pub use core::command::ActorKind;
pub use core::command::ActorRequirement;
pub use core::command::Command;
pub use core::command::CommandError;
pub use core::command::CommandKind;
pub use core::command::ScopeRequirement;
pub use core::consent::ConsentRecord;
pub use core::context::ActorContext;
pub use core::context::ActorContextError;
pub use core::context::BusinessContext;
pub use core::context::BusinessLifecycle;
pub use core::context::NullBusinessContext;
pub use core::context::TenantScope;
pub use core::event::EventEnvelope;
pub use core::health::HealthMode;
pub use core::health::SystemHealth;
pub use core::identifiers::ActorId;
pub use core::identifiers::AuditEntryId;
pub use core::identifiers::BranchId;
pub use core::identifiers::CommandId;
pub use core::identifiers::ConsentId;
pub use core::identifiers::CorrelationId;
pub use core::identifiers::EventId;
pub use core::identifiers::TenantId;
pub use core::rejection::ReasonCode;
pub use core::rejection::RejectionReason;
pub use core::time::Clock;
pub use core::time::FixedClock;
pub use core::time::SystemClock;
pub use core::time::TimeWindow;
