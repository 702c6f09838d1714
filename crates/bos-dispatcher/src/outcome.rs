// crates/bos-dispatcher/src/outcome.rs
// ============================================================================
// Module: BOS Dispatch Outcome
// Description: The terminal value a `dispatch` call produces, the handler
//              contract engines implement, and dispatcher-level errors.
// Purpose: Implement §4.1 step 5 "Outcome envelope" and §4.4 "Engine Contract"
//          item 5 ("a service that exposes handle(command)").
// Dependencies: bos-core, bos-events, bos-security
// ============================================================================

use bos_core::core::command::Command;
use bos_core::core::event::EventEnvelope;
use bos_core::core::rejection::RejectionReason;
use bos_events::PersistResult;
use bos_security::AnomalyVerdict;

/// Everything an accepted command's handler reports back to the dispatcher.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The event type emitted for this command (§4.3 "Event naming law").
    pub event_type: String,
    /// The emitted event envelope.
    pub event: EventEnvelope,
    /// The outcome of handing the event to the persistence sink.
    pub persisted: PersistResult,
    /// Whether the projection store applied the event.
    pub projection_applied: bool,
    /// Engine-specific result detail, opaque to the dispatcher.
    pub detail: Option<serde_json::Value>,
}

/// The terminal result of one `dispatch` call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The command was accepted and an event emitted.
    Accepted {
        /// The handler's execution result.
        result: ExecutionResult,
        /// A WARN-severity anomaly finding flagged alongside acceptance, if any
        /// (§4.2 row 5: "WARN-severity anomalies allow the command but are
        /// flagged in the outcome").
        anomaly_warning: Option<AnomalyVerdict>,
    },
    /// The command was rejected by a guard or by context validation.
    Rejected {
        /// The rejection reason.
        reason: RejectionReason,
    },
}

/// Implemented by an engine's service to accept dispatch once every guard has
/// passed (§4.4 item 5).
pub trait CommandHandler: Send + Sync {
    /// Handles an already-authorized command, producing its execution result.
    ///
    /// # Errors
    ///
    /// Returns a [`RejectionReason`] when engine-owned business rules (not the
    /// fixed guard stack) deny the command, e.g. `INSUFFICIENT_STOCK`.
    fn handle(&self, command: &Command) -> Result<ExecutionResult, RejectionReason>;
}

/// Programmer errors surfaced by [`crate::Dispatcher::dispatch`] that are not
/// policy-driven rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatcherError {
    /// No handler is registered for the command's intent.
    ///
    /// A correctly wired system never reaches this; it is surfaced as an
    /// `Err` rather than a `Rejection` so callers can distinguish "this
    /// command is disallowed" from "this engine was never wired up"
    /// without the dispatcher panicking (the workspace forbids `panic!`).
    #[error("no handler registered for intent `{0}`")]
    NoHandler(String),
}
