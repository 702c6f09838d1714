// demos/cash-engine/src/handler.rs
// ============================================================================
// Module: Cash Engine Handler
// Description: The `CommandHandler` this engine registers with the dispatcher
//              for each of its three owned intents.
// Purpose: Implement §4.3 "Engine handler": internal scope guard, internal
//          feature-flag check against this engine's own flag key, payload
//          build, event factory, persist, and (if accepted) projection apply.
// Dependencies: bos-core, bos-dispatcher, bos-events, bos-projection, serde_json
// ============================================================================

//! ## Overview
//! The dispatcher's guard stack already runs a generic scope guard and a
//! generic feature-flag guard against whatever flag key the host wired up for
//! an intent (§4.2 rows 2 and 6) before `handle` is ever called. This handler
//! additionally enforces its own hardcoded master flag,
//! [`ENABLE_CASH_ENGINE_FLAG_KEY`], and reasserts the scope invariant
//! internally — defence in depth, not a substitute for the dispatcher's own
//! checks.

use std::sync::Arc;

use bos_core::core::command::Command;
use bos_core::core::command::ScopeRequirement;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::rejection::RejectionReason;
use bos_core::core::time::Clock;
use bos_core::interfaces::providers::FeatureFlagProvider;
use bos_core::interfaces::providers::FlagStatus;
use bos_core::NullBusinessContext;
use bos_dispatcher::guards;
use bos_dispatcher::CommandHandler;
use bos_dispatcher::ExecutionResult;
use bos_events::EventTypeRegistry;
use bos_events::PersistenceSink;

use crate::commands;
use crate::payload;
use crate::projection::CashProjection;
use crate::projection::SessionStatus;

/// This engine's own master feature flag, checked in addition to whatever
/// flag key the dispatcher's host wired up for its intents.
pub const ENABLE_CASH_ENGINE_FLAG_KEY: &str = "ENABLE_CASH_ENGINE";

const POLICY_NAME: &str = "cash_engine";

/// The cash engine's `CommandHandler`: opens sessions, records payments, and
/// closes sessions against its own [`CashProjection`].
pub struct CashEngine {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn PersistenceSink>,
    event_registry: Arc<EventTypeRegistry>,
    projection: Arc<CashProjection>,
    feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
}

impl CashEngine {
    /// Builds a handler backed by `clock`, `sink`, and `event_registry`, with
    /// a fresh [`CashProjection`].
    ///
    /// `feature_flag_provider` is optional: its absence fails open on the
    /// engine's internal master-flag check, matching the dispatcher's own
    /// governance-guard doctrine (§7).
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        sink: Arc<dyn PersistenceSink>,
        event_registry: Arc<EventTypeRegistry>,
        feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
    ) -> Self {
        event_registry.register_all(commands::owned_event_types());
        Self { clock, sink, event_registry, projection: Arc::new(CashProjection::new()), feature_flag_provider }
    }

    /// Returns the projection this handler folds accepted events into.
    #[must_use]
    pub fn projection(&self) -> &Arc<CashProjection> {
        &self.projection
    }

    /// Internal defence-in-depth scope guard: every intent this engine owns
    /// is `BranchRequired`, so `Command::new` already guarantees a branch id
    /// is present; this can never actually trigger, but mirrors the
    /// dispatcher's own scope check.
    fn internal_scope_guard(command: &Command) -> Result<(), RejectionReason> {
        if command.scope_requirement() == ScopeRequirement::BranchRequired && command.branch_id().is_none() {
            return Err(RejectionReason::new(ReasonCode::BranchRequiredMissing, "a branch id is required for this command", POLICY_NAME));
        }
        Ok(())
    }

    /// Internal master feature-flag check against [`ENABLE_CASH_ENGINE_FLAG_KEY`].
    /// Provider absence or a provider error both fail open (§7).
    fn internal_feature_flag_guard(&self, command: &Command) -> Result<(), RejectionReason> {
        let Some(provider) = self.feature_flag_provider.as_ref() else { return Ok(()) };
        let Ok(records) = provider.flags_for_tenant(command.tenant_id()) else { return Ok(()) };
        match guards::resolve_flag(&records, ENABLE_CASH_ENGINE_FLAG_KEY, command.branch_id()) {
            Some(FlagStatus::Disabled) => Err(RejectionReason::new(
                ReasonCode::FeatureDisabled,
                format!("feature `{ENABLE_CASH_ENGINE_FLAG_KEY}` is disabled"),
                POLICY_NAME,
            )),
            Some(FlagStatus::Enabled) | None => Ok(()),
        }
    }

    /// Rejects unless the named session exists and is still open.
    fn require_open_session(&self, session_id: &str) -> Result<(), RejectionReason> {
        match self.projection.session(session_id) {
            Some(session) if session.status == SessionStatus::Open => Ok(()),
            _ => Err(RejectionReason::new(
                ReasonCode::Engine("SESSION_NOT_OPEN".to_string()),
                format!("session `{session_id}` is not open"),
                POLICY_NAME,
            )),
        }
    }

    /// Shared accept path: build the event, persist it, and — if accepted —
    /// fold it into the projection.
    fn accept(&self, command: &Command, event_type: &str, built_payload: bos_core::core::command::Payload) -> ExecutionResult {
        let event = bos_events::build_event(command, event_type, built_payload, self.clock.as_ref());
        let persisted = self.sink.persist(&event, &NullBusinessContext, &self.event_registry, command.scope_requirement());
        let projection_applied = if persisted.accepted {
            self.projection.apply(event.event_type(), event.payload());
            true
        } else {
            false
        };
        ExecutionResult { event_type: event_type.to_string(), event, persisted, projection_applied, detail: None }
    }
}

impl CommandHandler for CashEngine {
    fn handle(&self, command: &Command) -> Result<ExecutionResult, RejectionReason> {
        Self::internal_scope_guard(command)?;
        self.internal_feature_flag_guard(command)?;

        match command.intent() {
            intent if intent == commands::OPEN_SESSION_INTENT => {
                let built = payload::build_open_session_payload(command)?;
                Ok(self.accept(command, commands::SESSION_OPENED_EVENT, built))
            }
            intent if intent == commands::RECORD_PAYMENT_INTENT => {
                let built = payload::build_payment_payload(command)?;
                let session_id = built.get("session_id").and_then(serde_json::Value::as_str).unwrap_or_default();
                self.require_open_session(session_id)?;
                Ok(self.accept(command, commands::PAYMENT_RECORDED_EVENT, built))
            }
            intent if intent == commands::CLOSE_SESSION_INTENT => {
                let built = payload::build_close_session_payload(command)?;
                let session_id = built.get("session_id").and_then(serde_json::Value::as_str).unwrap_or_default();
                self.require_open_session(session_id)?;
                Ok(self.accept(command, commands::SESSION_CLOSED_EVENT, built))
            }
            other => Err(RejectionReason::new(
                ReasonCode::InvalidCommandType,
                format!("cash engine does not own intent `{other}`"),
                POLICY_NAME,
            )),
        }
    }
}
