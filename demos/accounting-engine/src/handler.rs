// demos/accounting-engine/src/handler.rs
// ============================================================================
// Module: Accounting Engine Handler
// Description: The `CommandHandler` this engine registers with the
//              dispatcher for its three owned intents.
// Purpose: Implement §4.3 "Engine handler": internal feature-flag check, the
//          `UNBALANCED_ENTRY`/`OBLIGATION_NOT_FOUND`/`OBLIGATION_OVERFULFILLED`
//          business rules, payload build, event factory, persist, and
//          projection apply.
// Dependencies: bos-core, bos-dispatcher, bos-events, bos-projection,
//               serde_json
// ============================================================================

use std::sync::Arc;

use bos_core::core::command::Command;
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
use serde_json::Value;

use crate::commands;
use crate::payload;
use crate::projection::AccountingProjection;

/// This engine's own master feature flag.
pub const ENABLE_ACCOUNTING_ENGINE_FLAG_KEY: &str = "ENABLE_ACCOUNTING_ENGINE";

const POLICY_NAME: &str = "accounting_engine";

/// The accounting engine's `CommandHandler`: posts journal entries and
/// tracks obligation fulfilment against its own [`AccountingProjection`].
pub struct AccountingEngine {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn PersistenceSink>,
    event_registry: Arc<EventTypeRegistry>,
    projection: Arc<AccountingProjection>,
    feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
}

impl AccountingEngine {
    /// Builds a handler backed by `clock`, `sink`, and `event_registry`, with
    /// a fresh [`AccountingProjection`].
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        sink: Arc<dyn PersistenceSink>,
        event_registry: Arc<EventTypeRegistry>,
        feature_flag_provider: Option<Arc<dyn FeatureFlagProvider>>,
    ) -> Self {
        event_registry.register_all(commands::owned_event_types());
        Self { clock, sink, event_registry, projection: Arc::new(AccountingProjection::new()), feature_flag_provider }
    }

    /// Returns the projection this handler folds accepted events into.
    #[must_use]
    pub fn projection(&self) -> &Arc<AccountingProjection> {
        &self.projection
    }

    fn internal_feature_flag_guard(&self, command: &Command) -> Result<(), RejectionReason> {
        let Some(provider) = self.feature_flag_provider.as_ref() else { return Ok(()) };
        let Ok(records) = provider.flags_for_tenant(command.tenant_id()) else { return Ok(()) };
        match guards::resolve_flag(&records, ENABLE_ACCOUNTING_ENGINE_FLAG_KEY, command.branch_id()) {
            Some(FlagStatus::Disabled) => Err(RejectionReason::new(
                ReasonCode::FeatureDisabled,
                format!("feature `{ENABLE_ACCOUNTING_ENGINE_FLAG_KEY}` is disabled"),
                POLICY_NAME,
            )),
            Some(FlagStatus::Enabled) | None => Ok(()),
        }
    }

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

impl CommandHandler for AccountingEngine {
    fn handle(&self, command: &Command) -> Result<ExecutionResult, RejectionReason> {
        self.internal_feature_flag_guard(command)?;

        match command.intent() {
            intent if intent == commands::POST_JOURNAL_ENTRY_INTENT => {
                let lines = payload::parse_journal_lines(command.payload())?;
                let total_debit: i64 = lines.iter().map(|line| line.debit).sum();
                let total_credit: i64 = lines.iter().map(|line| line.credit).sum();
                if total_debit != total_credit {
                    return Err(RejectionReason::new(
                        ReasonCode::Engine("UNBALANCED_ENTRY".to_string()),
                        format!("entry debits {total_debit} do not equal credits {total_credit}"),
                        POLICY_NAME,
                    ));
                }
                let built = payload::build_journal_payload(command, &lines)?;
                Ok(self.accept(command, commands::JOURNAL_POSTED_EVENT, built))
            }
            intent if intent == commands::RECORD_OBLIGATION_INTENT => {
                let built = payload::build_record_obligation_payload(command)?;
                Ok(self.accept(command, commands::OBLIGATION_RECORDED_EVENT, built))
            }
            intent if intent == commands::FULFILL_OBLIGATION_INTENT => {
                let built = payload::build_fulfill_obligation_payload(command)?;
                let obligation_id = built.get("obligation_id").and_then(Value::as_str).unwrap_or_default();
                let amount = built.get("amount").and_then(Value::as_i64).unwrap_or_default();
                let record = self.projection.obligation(obligation_id).ok_or_else(|| {
                    RejectionReason::new(
                        ReasonCode::Engine("OBLIGATION_NOT_FOUND".to_string()),
                        format!("obligation `{obligation_id}` does not exist"),
                        POLICY_NAME,
                    )
                })?;
                if amount > record.remaining() {
                    return Err(RejectionReason::new(
                        ReasonCode::Engine("OBLIGATION_OVERFULFILLED".to_string()),
                        format!("fulfilment of {amount} exceeds the {} remaining on obligation `{obligation_id}`", record.remaining()),
                        POLICY_NAME,
                    ));
                }
                Ok(self.accept(command, commands::OBLIGATION_FULFILLED_EVENT, built))
            }
            other => Err(RejectionReason::new(
                ReasonCode::InvalidCommandType,
                format!("accounting engine does not own intent `{other}`"),
                POLICY_NAME,
            )),
        }
    }
}
